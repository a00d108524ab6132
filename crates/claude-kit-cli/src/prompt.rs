use anyhow::Result;
use claude_kit::models::message::Message;

pub mod rustyline;

pub trait Prompt {
    fn render(&mut self, message: &Message);
    fn render_error(&mut self, error: &str);
    fn get_input(&mut self) -> Result<Input>;
    fn show_busy(&mut self);
    fn hide_busy(&self);
    fn close(&self);
    fn ready(&self) {
        println!();
        println!("Chat session started. Type /help for commands, /quit to leave.");
        println!();
    }
}

#[derive(Debug, PartialEq)]
pub struct Input {
    pub input_type: InputType,
    pub content: Option<String>, // Only set for InputType::Message
}

#[derive(Debug, PartialEq)]
pub enum InputType {
    AskAgain,     // Ask the user for input again. Control flow command.
    Message,      // User sent a message
    Clear,        // Start the conversation over
    ToggleTheme,  // Switch between light and dark output
    Help,         // Show the command list
    Exit,         // User wants to exit the session
}

impl Input {
    fn control(input_type: InputType) -> Self {
        Input {
            input_type,
            content: None,
        }
    }
}

/// Interpret a line typed at the session prompt
pub fn parse_input(line: &str) -> Input {
    let text = line.trim();
    if text.is_empty() {
        return Input::control(InputType::AskAgain);
    }

    match text.to_ascii_lowercase().as_str() {
        "/quit" | "/exit" | "quit" | "exit" => Input::control(InputType::Exit),
        "/clear" => Input::control(InputType::Clear),
        "/t" | "/theme" => Input::control(InputType::ToggleTheme),
        "/?" | "/help" => Input::control(InputType::Help),
        _ => Input {
            input_type: InputType::Message,
            content: Some(text.to_string()),
        },
    }
}

pub fn print_help() {
    println!("Commands:");
    println!("/clear - Forget the conversation so far");
    println!("/quit | /exit - Exit the session");
    println!("/t - Toggle Light/Dark theme");
    println!("/? | /help - Display this help message");
}
