use anyhow::Result;
use cliclack::spinner;
use claude_kit::models::message::Message;
use console::style;

use super::{parse_input, print_help, Input, InputType, Prompt};
use crate::output::{print_error, print_message, Theme};

const PROMPT: &str = "\x1b[1m\x1b[38;5;30mYou> \x1b[0m";

pub struct RustylinePrompt {
    spinner: cliclack::ProgressBar,
    editor: rustyline::DefaultEditor,
    theme: Theme,
}

impl RustylinePrompt {
    pub fn new() -> Result<Self> {
        Ok(RustylinePrompt {
            spinner: spinner(),
            editor: rustyline::DefaultEditor::new()?,
            theme: Theme::Dark,
        })
    }
}

impl Prompt for RustylinePrompt {
    fn render(&mut self, message: &Message) {
        println!("{}", style("Claude:").cyan().bold());
        if let Err(e) = print_message(message, self.theme) {
            print_error(&e.to_string());
        }
    }

    fn render_error(&mut self, error: &str) {
        print_error(error);
    }

    fn show_busy(&mut self) {
        self.spinner = spinner();
        self.spinner.start("Thinking...");
    }

    fn hide_busy(&self) {
        self.spinner.stop("");
    }

    fn get_input(&mut self) -> Result<Input> {
        let line = match self.editor.readline(PROMPT) {
            Ok(line) => line,
            Err(e) => {
                match e {
                    rustyline::error::ReadlineError::Interrupted
                    | rustyline::error::ReadlineError::Eof => (),
                    _ => eprintln!("Input error: {}", e),
                }
                return Ok(Input {
                    input_type: InputType::Exit,
                    content: None,
                });
            }
        };

        let input = parse_input(&line);
        match input.input_type {
            InputType::Message => {
                let _ = self.editor.add_history_entry(line.trim());
            }
            InputType::ToggleTheme => {
                self.theme = self.theme.toggle();
                println!("Switched to {:?} theme", self.theme);
            }
            InputType::Help => print_help(),
            _ => {}
        }
        Ok(input)
    }

    fn close(&self) {
        // No cleanup required
    }
}
