use std::io::{self, Write};

/// Helper function to read a line from stdin
pub fn read_line() -> io::Result<String> {
    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "standard input closed",
        ));
    }
    Ok(input.trim().to_string())
}

/// Print a label on the same line and read the answer
pub fn prompt(label: &str) -> io::Result<String> {
    print!("{}: ", label);
    io::stdout().flush()?;
    read_line()
}

/// Helper function to prompt for input with confirmation
pub fn prompt_with_confirmation(prompt: &str, confirmation: &str) -> io::Result<bool> {
    println!("{}", prompt);
    print!("{} (y/n): ", confirmation);
    io::stdout().flush()?;

    let response = read_line()?.to_lowercase();
    Ok(response.is_empty() || response == "y")
}

/// Show a numbered list and read a selection by number or by name
pub fn select_option<S: AsRef<str>>(label: &str, options: &[S]) -> io::Result<Option<usize>> {
    println!("\n{}:", label);
    for (index, option) in options.iter().enumerate() {
        println!("{}. {}", index + 1, option.as_ref());
    }
    let input = prompt("Enter number or name")?;
    Ok(parse_choice(&input, options))
}

/// Resolve a 1-based number or a case-insensitive option name
pub fn parse_choice<S: AsRef<str>>(input: &str, options: &[S]) -> Option<usize> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(number) = input.parse::<usize>() {
        return (1..=options.len()).contains(&number).then(|| number - 1);
    }
    options
        .iter()
        .position(|option| option.as_ref().eq_ignore_ascii_case(input))
}
