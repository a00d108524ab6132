//! Local functions the `tools` command exposes to the model

use anyhow::Result;
use claude_kit::models::tool::Tool;
use claude_kit::toolbox::Toolbox;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum ToolDemo {
    /// Simulated weather lookup
    Weather,
    /// add and multiply
    Calculator,
    /// Customer database lookup
    Customers,
}

impl ToolDemo {
    pub fn toolbox(&self) -> Toolbox {
        match self {
            ToolDemo::Weather => weather_toolbox(),
            ToolDemo::Calculator => calculator_toolbox(),
            ToolDemo::Customers => customer_toolbox(),
        }
    }

    pub fn default_question(&self) -> &'static str {
        match self {
            ToolDemo::Weather => "What's the weather like in San Francisco?",
            ToolDemo::Calculator => {
                "If I have 15 apples and I buy 7 more, then multiply that by 3, how many do I have?"
            }
            ToolDemo::Customers => "What is the email address for customer C001?",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Deserialize)]
pub struct WeatherArgs {
    pub location: String,
    #[serde(default)]
    pub unit: Unit,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct Weather {
    pub location: String,
    pub temperature: i64,
    pub unit: Unit,
    pub condition: &'static str,
}

/// Canned conditions keyed by city; anything else is 20°C and unknown
pub fn get_weather(args: WeatherArgs) -> Weather {
    let city = args.location.split(',').next().unwrap_or_default().trim();
    let (celsius, condition) = match city {
        "San Francisco" => (18, "Partly cloudy"),
        "New York" => (22, "Sunny"),
        "London" => (12, "Rainy"),
        _ => (20, "Unknown"),
    };
    let temperature = match args.unit {
        Unit::Celsius => celsius,
        Unit::Fahrenheit => (celsius as f64 * 9.0 / 5.0 + 32.0).round() as i64,
    };
    Weather {
        location: args.location,
        temperature,
        unit: args.unit,
        condition,
    }
}

#[derive(Debug, Deserialize)]
pub struct Operands {
    pub a: f64,
    pub b: f64,
}

#[derive(Debug, Deserialize)]
pub struct CustomerQuery {
    pub customer_id: String,
}

pub fn query_customers(query: CustomerQuery) -> serde_json::Value {
    match query.customer_id.as_str() {
        "C001" => json!({"name": "John Smith", "email": "john@example.com", "plan": "Premium"}),
        "C002" => json!({"name": "Sarah Johnson", "email": "sarah@example.com", "plan": "Basic"}),
        "C003" => json!({"name": "Mike Chen", "email": "mike@example.com", "plan": "Enterprise"}),
        _ => json!({"error": "Customer not found"}),
    }
}

fn operand_schema() -> serde_json::Value {
    json!({
        "type": "object",
        "properties": {
            "a": {"type": "number", "description": "First number"},
            "b": {"type": "number", "description": "Second number"}
        },
        "required": ["a", "b"]
    })
}

pub fn weather_toolbox() -> Toolbox {
    Toolbox::new().with_fn(
        Tool::new(
            "get_weather",
            "Get the current weather for a location. Returns temperature and conditions.",
            json!({
                "type": "object",
                "properties": {
                    "location": {
                        "type": "string",
                        "description": "The city and state, e.g. San Francisco, CA"
                    },
                    "unit": {
                        "type": "string",
                        "enum": ["celsius", "fahrenheit"],
                        "description": "The temperature unit"
                    }
                },
                "required": ["location"]
            }),
        ),
        |args: WeatherArgs| -> Result<Weather> { Ok(get_weather(args)) },
    )
}

pub fn calculator_toolbox() -> Toolbox {
    Toolbox::new()
        .with_fn(
            Tool::new("add", "Add two numbers together", operand_schema()),
            |o: Operands| -> Result<f64> { Ok(o.a + o.b) },
        )
        .with_fn(
            Tool::new("multiply", "Multiply two numbers", operand_schema()),
            |o: Operands| -> Result<f64> { Ok(o.a * o.b) },
        )
}

pub fn customer_toolbox() -> Toolbox {
    Toolbox::new().with_fn(
        Tool::new(
            "query_customers",
            "Query customer database. Returns customer information.",
            json!({
                "type": "object",
                "properties": {
                    "customer_id": {
                        "type": "string",
                        "description": "The customer ID to look up"
                    }
                },
                "required": ["customer_id"]
            }),
        ),
        |query: CustomerQuery| -> Result<serde_json::Value> { Ok(query_customers(query)) },
    )
}
