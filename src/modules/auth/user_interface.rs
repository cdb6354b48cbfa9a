// src/modules/auth/user_interface.rs
use std::io::{self, Write};

use super::credentials::CredentialService;
use super::error::AuthError;
use super::password::read_password;
use super::session::SessionController;
use crate::modules::records::user_interface::{
    handle_add_doctor, handle_add_patient, handle_view_doctors, handle_view_patients,
};
use crate::modules::storage::RecordStore;
use crate::modules::utils::io::{prompt, prompt_with_confirmation, read_line};

/// What the anonymous menu decided
#[derive(Debug, PartialEq, Eq)]
pub enum MainAuthResult {
    LoggedIn,
    Exit,
}

/// Entries of the authenticated navigation menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Home,
    AddPatient,
    ViewPatients,
    AddDoctor,
    ViewDoctors,
    Logout,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "home" => Some(MenuChoice::Home),
            "2" | "add-patient" => Some(MenuChoice::AddPatient),
            "3" | "view-patients" => Some(MenuChoice::ViewPatients),
            "4" | "add-doctor" => Some(MenuChoice::AddDoctor),
            "5" | "view-doctors" => Some(MenuChoice::ViewDoctors),
            "6" | "logout" => Some(MenuChoice::Logout),
            _ => None,
        }
    }
}

/// Function to show initial options when starting the program
pub fn show_initial_options() {
    println!("\n=== Hospital Management System ===");
    println!("1. Login                  (or type 'login')");
    println!("2. Sign up                (or type 'signup')");
    println!("3. Exit                   (or type 'exit')");
    println!("\nEnter your choice         (1-3 or command):");
}

fn show_navigation(username: &str) {
    println!("\n=== Welcome, {} ===", username);
    println!("1. Home                   (or type 'home')");
    println!("2. Add Patient            (or type 'add-patient')");
    println!("3. View Patients          (or type 'view-patients')");
    println!("4. Add Doctor             (or type 'add-doctor')");
    println!("5. View Doctors           (or type 'view-doctors')");
    println!("6. Logout                 (or type 'logout')");
    println!("\nEnter your choice         (1-6 or command):");
}

/// Anonymous loop: keep offering login and signup until a login succeeds
pub fn main_auth_flow(
    credentials: &CredentialService<'_>,
    session: &mut SessionController,
) -> io::Result<MainAuthResult> {
    loop {
        show_initial_options();

        let choice = read_line()?.to_lowercase();
        match choice.as_str() {
            "1" | "login" => {
                if handle_login(credentials, session)? {
                    return Ok(MainAuthResult::LoggedIn);
                }
            }
            "2" | "signup" | "sign up" | "register" => handle_signup(credentials)?,
            "3" | "exit" | "quit" => {
                println!("Goodbye!");
                return Ok(MainAuthResult::Exit);
            }
            _ => println!(
                "\nInvalid choice. Please enter a number (1-3) or command (login/signup/exit)."
            ),
        }
    }
}

/// Sign up page; never logs the new user in
pub fn handle_signup(credentials: &CredentialService<'_>) -> io::Result<()> {
    println!("\nCreate a new account");
    let username = prompt("Username")?;
    print!("Password: ");
    io::stdout().flush()?;
    let password = read_password()?;

    match credentials.signup(&username, &password) {
        Ok(()) => println!("\n✅ Account created! Please login now."),
        Err(AuthError::ValidationFailure(_)) => println!("\n⚠ Fill all fields."),
        Err(AuthError::DuplicateAccount(_)) => println!("\n⚠ Username already exists."),
        Err(e) => println!("\nRegistration failed: {}", e),
    }
    Ok(())
}

/// Login page; returns whether the session is now authenticated
pub fn handle_login(
    credentials: &CredentialService<'_>,
    session: &mut SessionController,
) -> io::Result<bool> {
    println!("\nLogin to your account");
    let username = prompt("Username")?;
    print!("Password: ");
    io::stdout().flush()?;
    let password = read_password()?;

    match session.login(credentials, &username, &password) {
        Ok(()) => {
            println!("\n✅ Welcome {}!", session.identity());
            Ok(true)
        }
        Err(AuthError::InvalidCredentials) => {
            println!("\n❌ Invalid username or password");
            Ok(false)
        }
        Err(e) => {
            println!("\nLogin failed: {}", e);
            Ok(session.is_authenticated())
        }
    }
}

/// Authenticated loop: serve the navigation menu until logout
pub fn handle_authenticated_session(
    store: &RecordStore,
    session: &mut SessionController,
) -> io::Result<()> {
    while session.is_authenticated() {
        let username = session.identity().to_string();
        show_navigation(&username);

        let Some(choice) = MenuChoice::parse(&read_line()?) else {
            println!("Unknown choice. Please enter 1-6 or a command.");
            continue;
        };

        match choice {
            MenuChoice::Home => {
                println!("\nWelcome to Hospital Management System");
                println!("Add patients, doctors and manage hospital data easily!");
            }
            MenuChoice::AddPatient => handle_add_patient(store, &username)?,
            MenuChoice::ViewPatients => handle_view_patients(store)?,
            MenuChoice::AddDoctor => handle_add_doctor(store, &username)?,
            MenuChoice::ViewDoctors => handle_view_doctors(store)?,
            MenuChoice::Logout => {
                if prompt_with_confirmation("\nYou are about to log out.", "Continue")? {
                    session.logout();
                    println!("✅ Logged out successfully! Please login again.");
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_choice_parsing() {
        assert_eq!(MenuChoice::parse("1"), Some(MenuChoice::Home));
        assert_eq!(MenuChoice::parse("add-patient"), Some(MenuChoice::AddPatient));
        assert_eq!(MenuChoice::parse(" VIEW-DOCTORS "), Some(MenuChoice::ViewDoctors));
        assert_eq!(MenuChoice::parse("6"), Some(MenuChoice::Logout));
        assert_eq!(MenuChoice::parse("7"), None);
        assert_eq!(MenuChoice::parse(""), None);
    }
}
