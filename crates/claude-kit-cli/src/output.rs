use std::io::{self, Write};

use anyhow::{anyhow, Result};
use bat::WrappingMode;
use claude_kit::models::message::{Message, MessageContent, ToolRequest, ToolResponse};
use console::style;
use serde_json::Value;

const MAX_STRING_LENGTH: usize = 40;
const INDENT: &str = "    ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn bat_theme(&self) -> &'static str {
        match self {
            Theme::Light => "GitHub",
            Theme::Dark => "zenburn",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

pub fn print_markdown(content: &str, theme: Theme) -> Result<()> {
    print_highlighted(content, "Markdown", theme)
}

pub fn print_json(value: &Value, theme: Theme) -> Result<()> {
    print_highlighted(&serde_json::to_string_pretty(value)?, "JSON", theme)
}

fn print_highlighted(content: &str, language: &str, theme: Theme) -> Result<()> {
    bat::PrettyPrinter::new()
        .input(bat::Input::from_bytes(content.as_bytes()))
        .theme(theme.bat_theme())
        .language(language)
        .wrapping_mode(WrappingMode::Character)
        .print()
        .map_err(|e| anyhow!("Failed to render output: {}", e))?;
    println!();
    io::stdout().flush()?;
    Ok(())
}

/// Render every block of a message: text as markdown, tool traffic as a compact summary
pub fn print_message(message: &Message, theme: Theme) -> Result<()> {
    for content in &message.content {
        match content {
            MessageContent::Text(text) => print_markdown(&text.text, theme)?,
            MessageContent::ToolRequest(request) => print_tool_request(request),
            MessageContent::ToolResponse(response) => print_tool_response(response),
        }
    }
    Ok(())
}

pub fn print_tool_request(request: &ToolRequest) {
    println!();
    println!(
        "─── {} | {} ──────────────────────────",
        style(&request.tool_call.name),
        style(&request.id).magenta().dim(),
    );
    print_params(&request.tool_call.arguments, 0);
}

pub fn print_tool_response(response: &ToolResponse) {
    println!("{} {}", style("result:").dim(), style(&response.output).cyan());
}

pub fn print_error(message: &str) {
    eprintln!("{} {}", style("error:").red().bold(), message);
}

/// Format and print parameters recursively with proper indentation and colors
pub fn print_params(value: &Value, depth: usize) {
    let indent = INDENT.repeat(depth);

    match value {
        Value::Object(map) => {
            for (key, val) in map {
                match val {
                    Value::Object(_) => {
                        println!("{}{}:", indent, style(key).dim());
                        print_params(val, depth + 1);
                    }
                    Value::Array(arr) => {
                        println!("{}{}:", indent, style(key).dim());
                        for item in arr.iter() {
                            println!("{}{}- ", indent, INDENT);
                            print_params(item, depth + 2);
                        }
                    }
                    Value::String(s) => {
                        if s.len() > MAX_STRING_LENGTH {
                            println!("{}{}: {}", indent, style(key).dim(), style("...").dim());
                        } else {
                            println!("{}{}: {}", indent, style(key).dim(), style(s).green());
                        }
                    }
                    Value::Number(n) => {
                        println!("{}{}: {}", indent, style(key).dim(), style(n).blue());
                    }
                    Value::Bool(b) => {
                        println!("{}{}: {}", indent, style(key).dim(), style(b).blue());
                    }
                    Value::Null => {
                        println!("{}{}: {}", indent, style(key).dim(), style("null").dim());
                    }
                }
            }
        }
        Value::Array(arr) => {
            for (i, item) in arr.iter().enumerate() {
                println!("{}{}.", indent, i + 1);
                print_params(item, depth + 1);
            }
        }
        Value::String(s) => {
            if s.len() > MAX_STRING_LENGTH {
                println!(
                    "{}{}",
                    indent,
                    style(format!("[{} chars]", s.len())).yellow()
                );
            } else {
                println!("{}{}", indent, style(s).green());
            }
        }
        Value::Number(n) => {
            println!("{}{}", indent, style(n).yellow());
        }
        Value::Bool(b) => {
            println!("{}{}", indent, style(b).yellow());
        }
        Value::Null => {
            println!("{}{}", indent, style("null").dim());
        }
    }
}
