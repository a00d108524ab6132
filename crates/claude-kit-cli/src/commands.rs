use claude_kit::providers::base::CompletionOptions;
use std::future::Future;

pub mod chat;
pub mod email;
pub mod extract;
pub mod review;
pub mod session;
pub mod structured;
pub mod summarize;
pub mod tools;

/// Show a cliclack spinner while `future` runs
pub async fn with_spinner<F: Future>(message: &str, future: F) -> F::Output {
    let spin = cliclack::spinner();
    spin.start(message);
    let output = future.await;
    spin.stop("");
    output
}

/// Use `temperature` unless one is already configured
pub fn with_default_temperature(
    options: &CompletionOptions,
    temperature: f32,
) -> CompletionOptions {
    let mut options = options.clone();
    options.temperature.get_or_insert(temperature);
    options
}
