// SPDX-License-Identifier: MIT OR Apache-2.0
//! Line-oriented console input for the headless player.

use intro_sequencer::{InputEvent, Key};
use thiserror::Error;

/// Help text listing console commands
pub const HELP: &str = "\
Available commands:
  click                - Activate the start control
  right | left         - Arrow keys
  esc | space          - Escape / spacebar
  key <NAME>           - Any key by DOM name
  drag <X0> <Y0> <X1> <Y1> - Pointer drag gesture
  move <X> <Y>         - Pointer move
  hide | show          - Document visibility
  load                 - Document finished loading
  status               - Show sequencer state
  help                 - Show this help
  quit                 - Leave the player";

/// A parsed console line
#[derive(Debug, Clone, PartialEq)]
pub enum ConsoleCommand {
    /// Raw input events to route, in order
    Input(Vec<InputEvent>),
    /// Print the sequencer state
    Status,
    /// Print the help text
    Help,
    /// Leave the player
    Quit,
}

/// Console parse errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsoleError {
    /// The first word is not a command
    #[error("Unknown command: {0}. Type 'help' for available commands.")]
    Unknown(String),

    /// Wrong number of arguments
    #[error("Usage: {0}")]
    Usage(&'static str),

    /// An argument is not a number
    #[error("Not a number: {0}")]
    Number(String),

    /// Unknown key name
    #[error("Unknown key: {0}")]
    Key(String),
}

/// Result type for console parsing
pub type Result<T> = std::result::Result<T, ConsoleError>;

/// Parse one console line. Blank lines yield `None`.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    let Some((&name, args)) = parts.split_first() else {
        return Ok(None);
    };

    let key = |key: Key| ConsoleCommand::Input(vec![InputEvent::Key(key)]);
    let command = match name.to_lowercase().as_str() {
        "click" | "start" => ConsoleCommand::Input(vec![InputEvent::Activate]),
        "right" | "next" => key(Key::Right),
        "left" | "prev" => key(Key::Left),
        "esc" | "skip" => key(Key::Escape),
        "space" | "pause" => key(Key::Space),
        "key" => {
            let [name] = args else {
                return Err(ConsoleError::Usage("key <NAME>"));
            };
            let parsed = Key::from_name(name).ok_or_else(|| ConsoleError::Key(name.to_string()))?;
            key(parsed)
        }
        "drag" => {
            let [x0, y0, x1, y1] = numbers::<4>(args, "drag <X0> <Y0> <X1> <Y1>")?;
            ConsoleCommand::Input(vec![
                InputEvent::PointerDown { x: x0, y: y0 },
                InputEvent::PointerUp { x: x1, y: y1 },
            ])
        }
        "move" => {
            let [x, y] = numbers::<2>(args, "move <X> <Y>")?;
            ConsoleCommand::Input(vec![InputEvent::PointerMove { x, y }])
        }
        "hide" => ConsoleCommand::Input(vec![InputEvent::VisibilityChanged { hidden: true }]),
        "show" => ConsoleCommand::Input(vec![InputEvent::VisibilityChanged { hidden: false }]),
        "load" => ConsoleCommand::Input(vec![InputEvent::Loaded]),
        "status" => ConsoleCommand::Status,
        "help" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        _ => return Err(ConsoleError::Unknown(name.to_string())),
    };
    Ok(Some(command))
}

fn numbers<const N: usize>(args: &[&str], usage: &'static str) -> Result<[f32; N]> {
    if args.len() != N {
        return Err(ConsoleError::Usage(usage));
    }

    let mut values = [0.0; N];
    for (slot, arg) in values.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .map_err(|_| ConsoleError::Number(arg.to_string()))?;
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn events(line: &str) -> Vec<InputEvent> {
        match parse_line(line) {
            Ok(Some(ConsoleCommand::Input(events))) => events,
            other => panic!("expected input events for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn test_key_commands() {
        assert_eq!(events("right"), vec![InputEvent::Key(Key::Right)]);
        assert_eq!(events("LEFT"), vec![InputEvent::Key(Key::Left)]);
        assert_eq!(events("esc"), vec![InputEvent::Key(Key::Escape)]);
        assert_eq!(events("space"), vec![InputEvent::Key(Key::Space)]);
        assert_eq!(events("key ArrowRight"), vec![InputEvent::Key(Key::Right)]);
        assert_eq!(
            parse_line("key Enter"),
            Err(ConsoleError::Key("Enter".to_string()))
        );
    }

    #[test]
    fn test_drag_and_move() {
        assert_eq!(
            events("drag 400 300 300 310"),
            vec![
                InputEvent::PointerDown { x: 400.0, y: 300.0 },
                InputEvent::PointerUp { x: 300.0, y: 310.0 },
            ]
        );
        assert_eq!(
            events("move 10.5 20"),
            vec![InputEvent::PointerMove { x: 10.5, y: 20.0 }]
        );
        assert_eq!(
            parse_line("drag 1 2 3"),
            Err(ConsoleError::Usage("drag <X0> <Y0> <X1> <Y1>"))
        );
        assert_eq!(
            parse_line("move 1 up"),
            Err(ConsoleError::Number("up".to_string()))
        );
    }

    #[test]
    fn test_document_and_control_commands() {
        assert_eq!(events("click"), vec![InputEvent::Activate]);
        assert_eq!(events("hide"), vec![InputEvent::VisibilityChanged { hidden: true }]);
        assert_eq!(events("load"), vec![InputEvent::Loaded]);
        assert_eq!(parse_line("status"), Ok(Some(ConsoleCommand::Status)));
        assert_eq!(parse_line("quit"), Ok(Some(ConsoleCommand::Quit)));
        assert_eq!(
            parse_line("dance"),
            Err(ConsoleError::Unknown("dance".to_string()))
        );
    }
}
