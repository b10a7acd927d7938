use std::io;
use std::time::Duration;

use crossterm::event::Event;

use crate::drivers::InputDriver;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    Continue,
    Quit,
}

/// Single-threaded pump that owns the input driver.
///
/// Every iteration first calls the handler with `None` (a tick, used for
/// animation and redraw), then drains whatever input is pending so drags and
/// scroll bursts never lag behind the frame rate.
pub struct EventLoop<D> {
    driver: D,
    poll_interval: Duration,
}

impl<D: InputDriver> EventLoop<D> {
    pub fn new(driver: D, poll_interval: Duration) -> Self {
        Self {
            driver,
            poll_interval,
        }
    }

    pub fn driver(&mut self) -> &mut D {
        &mut self.driver
    }

    pub fn into_driver(self) -> D {
        self.driver
    }

    pub fn run<F>(&mut self, mut handler: F) -> io::Result<()>
    where
        F: FnMut(&mut D, Option<Event>) -> io::Result<ControlFlow>,
    {
        loop {
            if handler(&mut self.driver, None)? == ControlFlow::Quit {
                return Ok(());
            }
            if !self.driver.poll(self.poll_interval)? {
                continue;
            }
            loop {
                let event = self.driver.read()?;
                if handler(&mut self.driver, Some(event))? == ControlFlow::Quit {
                    return Ok(());
                }
                if !self.driver.poll(Duration::ZERO)? {
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::ScriptedInput;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn key(c: char) -> Event {
        Event::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
    }

    #[test]
    fn ticks_then_drains_pending_events() {
        let mut event_loop = EventLoop::new(
            ScriptedInput::new([key('a'), key('b'), key('q')]),
            Duration::ZERO,
        );
        let mut seen = Vec::new();
        event_loop
            .run(|_, event| {
                match event {
                    None => seen.push('.'),
                    Some(Event::Key(k)) => {
                        if let KeyCode::Char(c) = k.code {
                            seen.push(c);
                            if c == 'q' {
                                return Ok(ControlFlow::Quit);
                            }
                        }
                    }
                    Some(_) => {}
                }
                Ok(ControlFlow::Continue)
            })
            .unwrap();
        assert_eq!(seen, vec!['.', 'a', 'b', 'q']);
    }

    #[test]
    fn quit_on_tick_stops_before_reading() {
        let mut event_loop = EventLoop::new(ScriptedInput::new([key('a')]), Duration::ZERO);
        event_loop.run(|_, _| Ok(ControlFlow::Quit)).unwrap();
        assert_eq!(event_loop.into_driver().remaining(), 1);
    }
}
