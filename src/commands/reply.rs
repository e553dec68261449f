//! Dry run of the generator chain for a single piece of text.

use crate::config::Config;
use crate::error::Result;
use crate::responder::GeneratedReply;

use super::autoreply::build_generator;

pub async fn run(config: &Config, text: &str) -> Result<GeneratedReply> {
    let generator = build_generator(config)?;
    Ok(generator.generate(text).await)
}

pub fn print_reply(reply: &GeneratedReply) {
    if reply.is_fallback() {
        println!("⚠️  No model tier succeeded, fallback reply:");
    } else {
        println!("🤖 {}:", reply.model);
    }
    println!("{}", reply.text);
}
