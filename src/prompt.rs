use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};

use crate::error::Result;


/// Asks the user for a value. Implemented over a terminal and by scripted answers in tests.
pub trait Prompt {

    /// Index of the chosen item.
    fn select(&mut self, message: &str, items: &[&str], default: usize) -> Result<usize>;

    /// Free text, re-asked until `validate` accepts it.
    fn text(&mut self, message: &str, default: &str, validate: &dyn Fn(&str) -> Result<(), String>) -> Result<String>;

}


#[derive(Default)]
pub struct TerminalPrompt {
    theme: ColorfulTheme,
}

impl Prompt for TerminalPrompt {

    fn select(&mut self, message: &str, items: &[&str], default: usize) -> Result<usize> {
        Ok(Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(items)
            .default(default)
            .interact()?)
    }


    fn text(&mut self, message: &str, default: &str, validate: &dyn Fn(&str) -> Result<(), String>) -> Result<String> {
        Ok(Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .default(default.to_string())
            .validate_with(|input: &String| validate(input))
            .interact_text()?)
    }

}
