//! Terminal implementation of [`Prompter`].

use dialoguer::{Confirm, Password};
use std::io;
use tunnel_link_core::contract::Prompter;

pub struct TerminalPrompter;

fn to_io(e: dialoguer::Error) -> io::Error {
    io::Error::other(e)
}

impl Prompter for TerminalPrompter {
    fn secret(&self, guidance: &str) -> io::Result<String> {
        println!("{guidance}");
        Password::new()
            .with_prompt("Paste the token here (input is hidden)")
            .allow_empty_password(true)
            .interact()
            .map_err(to_io)
    }

    fn confirm(&self, question: &str, default: bool) -> io::Result<bool> {
        Confirm::new()
            .with_prompt(question)
            .default(default)
            .interact()
            .map_err(to_io)
    }
}
