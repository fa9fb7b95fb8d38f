// (c) 2025 Ross Younger

//! Main client mode event loop
//!
//! Interactive: an initial register-or-login choice, then a
//! single-character command loop until Quit. Every wire status is rendered
//! as a human-readable message, never as raw protocol values.

use std::path::Path;

use anyhow::{Context as _, Result};
use console::Term;
use human_repr::HumanCount as _;
use indicatif::{ProgressBar, ProgressStyle};
use tokio::net::TcpStream;
use tracing::debug;

use crate::cli::styles::{ERROR, RESET, SUCCESS};
use crate::client::input::{self, credential_weaknesses, valid_directory_name};
use crate::config::Configuration;
use crate::protocol::common::{SendReceivePair, TcpStreamPair};
use crate::protocol::session::{RequestCode, Status};
use crate::session::common::ResponseMismatch;
use crate::session::{auth, download, list, mkdir, remove, upload};
use crate::transport::{self, TransportError};

const MENU: &str = "press U to upload, D to download, R to remove a file or directory, \
L to list your files, C to create a directory or Q to quit -> ";

/// Client mode entrypoint: connect, authenticate, run the command loop.
///
/// # Return
/// true if the user's business completed; false for a failure already
/// reported to them.
pub(crate) async fn client_main(config: &Configuration) -> Result<bool> {
    let term = Term::stderr();
    let stream = TcpStream::connect((config.address.as_str(), config.port))
        .await
        .with_context(|| format!("connecting to {}:{}", config.address, config.port))?;
    debug!("connected to {}", stream.peer_addr()?);
    let (recv, send) = stream.into_split();
    let mut stream = SendReceivePair { send, recv };

    let choice = input::prompt(&term, "Press 1 to register, 2 to sign in -> ")?;
    match choice.trim() {
        "1" => run_register(&term, &mut stream).await,
        "2" => run_login(&term, &mut stream).await,
        _ => {
            eprintln!("Invalid choice; quitting.");
            quit(&mut stream).await?;
            Ok(false)
        }
    }
}

async fn run_register(term: &Term, stream: &mut TcpStreamPair) -> Result<bool> {
    let username = input::prompt(term, "choose username -> ")?;
    let password = input::prompt_secret(term, "choose password -> ")?;
    let again = input::prompt_secret(term, "enter password again -> ")?;
    if password != again {
        eprintln!("Passwords do not match; quitting.");
        quit(stream).await?;
        return Ok(false);
    }
    let problems = credential_weaknesses(&username, &password);
    if !problems.is_empty() {
        for problem in &problems {
            eprintln!("{problem}");
        }
        eprintln!("Please try again.");
        quit(stream).await?;
        return Ok(false);
    }

    match auth::register(stream, &username, &password).await {
        Ok(()) => {
            eprintln!(
                "{SUCCESS}Registered successfully!{RESET} Reconnect and sign in to start a session."
            );
            Ok(true)
        }
        Err(e) => {
            report(&e);
            Ok(false)
        }
    }
}

async fn run_login(term: &Term, stream: &mut TcpStreamPair) -> Result<bool> {
    let username = input::prompt(term, "enter username -> ")?;
    let password = input::prompt_secret(term, "enter password -> ")?;
    if let Err(e) = auth::login(stream, &username, &password).await {
        report(&e);
        return Ok(false);
    }
    eprintln!("{SUCCESS}Logged in successfully!{RESET}");
    interactive_loop(term, stream).await?;
    Ok(true)
}

/// The post-login command loop. A domain refusal only aborts the one
/// command; a transport failure ends the session.
async fn interactive_loop(term: &Term, stream: &mut TcpStreamPair) -> Result<()> {
    loop {
        let choice = input::prompt(term, MENU)?;
        let result = match choice.trim().to_ascii_uppercase().as_str() {
            "U" => do_upload(term, stream).await,
            "D" => do_download(term, stream).await,
            "R" => do_remove(term, stream).await,
            "L" => do_list(stream).await,
            "C" => do_mkdir(term, stream).await,
            "Q" => {
                quit(stream).await?;
                eprintln!("Exiting session. See you next time.");
                return Ok(());
            }
            _ => {
                eprintln!("Invalid command, try again");
                continue;
            }
        };
        if let Err(e) = result {
            report(&e);
            if e.downcast_ref::<TransportError>().is_some() {
                return Err(e);
            }
        }
    }
}

async fn do_upload(term: &Term, stream: &mut TcpStreamPair) -> Result<()> {
    let path = input::prompt(term, "Enter file path to upload -> ")?;
    let path = Path::new(path.trim()).to_owned();
    if path.is_dir() {
        eprintln!("That is a directory; enter a file path.");
        return Ok(());
    }
    if !path.exists() {
        eprintln!("That file does not exist.");
        return Ok(());
    }
    let Some(file_name) = path.file_name().and_then(|n| n.to_str()).map(String::from) else {
        eprintln!("Cannot determine a file name from that path.");
        return Ok(());
    };

    let dir = input::prompt(
        term,
        "Enter server directory to store it in (just enter for the root) -> ",
    )?;
    let dir = dir.trim();
    if dir.starts_with('/') {
        eprintln!("Enter a relative directory name, not an absolute path.");
        return Ok(());
    }

    let content = tokio::fs::read(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    eprintln!(
        "Uploading {file_name} ({})...",
        content.len().human_count_bytes()
    );
    let bar = transfer_bar(content.len() as u64)?;
    let result = upload::send(stream, &file_name, dir, &content, &bar).await;
    bar.finish_and_clear();
    result?;
    eprintln!("{SUCCESS}File uploaded successfully{RESET}");
    Ok(())
}

async fn do_download(term: &Term, stream: &mut TcpStreamPair) -> Result<()> {
    let name = input::prompt(term, "Enter the file name to download -> ")?;
    let name = name.trim().to_string();

    let bar = transfer_bar(0)?;
    let result = download::send(stream, &name, &bar).await;
    bar.finish_and_clear();
    let content = result?;

    let dir = input::prompt(term, "Enter directory path to save the file in -> ")?;
    let dir = Path::new(dir.trim()).to_owned();
    if !dir.is_dir() {
        eprintln!("That path does not exist; aborting.");
        return Ok(());
    }
    let Some(base) = Path::new(&name).file_name() else {
        eprintln!("Cannot determine a local file name; aborting.");
        return Ok(());
    };
    let dest = dir.join(base);
    if dest.exists() {
        eprintln!("A file with that name already exists there; choose a different directory.");
        return Ok(());
    }
    match tokio::fs::write(&dest, &content).await {
        Ok(()) => eprintln!(
            "{SUCCESS}File downloaded successfully!{RESET} ({})",
            content.len().human_count_bytes()
        ),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            eprintln!("Not permitted to write the file to that path.");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

async fn do_remove(term: &Term, stream: &mut TcpStreamPair) -> Result<()> {
    let name = input::prompt(
        term,
        "Enter file or directory name to remove (removing a directory removes all its contents) -> ",
    )?;
    remove::send(stream, name.trim()).await?;
    eprintln!("{SUCCESS}Removed successfully!{RESET}");
    Ok(())
}

async fn do_list(stream: &mut TcpStreamPair) -> Result<()> {
    let listing = list::send(stream).await?;
    if listing.is_empty() {
        eprintln!("No files yet.");
    } else {
        eprintln!("Files and directories: {listing}");
    }
    Ok(())
}

async fn do_mkdir(term: &Term, stream: &mut TcpStreamPair) -> Result<()> {
    let name = input::prompt(
        term,
        "Enter directory name (use a/b for nested directories) -> ",
    )?;
    let name = name.trim();
    if !valid_directory_name(name) {
        eprintln!("Invalid directory name: relative paths with letters and numbers only.");
        return Ok(());
    }
    mkdir::send(stream, name).await?;
    eprintln!("{SUCCESS}Directory created!{RESET}");
    Ok(())
}

/// Tells the server the session is over. No response is expected.
async fn quit(stream: &mut TcpStreamPair) -> Result<()> {
    Ok(transport::send_request(&mut stream.send, RequestCode::Quit, &[]).await?)
}

fn transfer_bar(len: u64) -> Result<ProgressBar> {
    Ok(ProgressBar::new(len).with_style(ProgressStyle::with_template(
        "{bar:40} {bytes}/{total_bytes} {bytes_per_sec}",
    )?))
}

/// Human-readable rendering of a command failure.
fn report(error: &anyhow::Error) {
    if let Some(status) = error.downcast_ref::<Status>() {
        eprintln!("{ERROR}{}{RESET}", describe(*status));
    } else if let Some(mismatch) = error.downcast_ref::<ResponseMismatch>() {
        eprintln!("{ERROR}Got an invalid response from the server ({mismatch}); request abandoned.{RESET}");
    } else {
        eprintln!("{ERROR}Error:{RESET} {error:#}");
    }
}

fn describe(status: Status) -> &'static str {
    match status {
        Status::Ok => "OK",
        Status::UserNotFound => "That username does not exist.",
        Status::NotLoggedIn => "You must log in first.",
        Status::UserAlreadyExists => "User already exists! Try a different username.",
        Status::FileAlreadyExists => {
            "A file with that name is already on the server. Try another name."
        }
        Status::FileNotFound => "No such file on the server.",
        Status::IncorrectPassword => "Incorrect password.",
        Status::StartUpload => "The server asked to start an upload out of turn.",
        Status::DirectoryAlreadyExists => "That directory already exists.",
        Status::IsADirectory => "That is a directory; enter a file name.",
        Status::DirectoryNotFound => "No such directory on the server.",
    }
}

#[cfg(test)]
mod tests {
    use super::describe;
    use crate::protocol::session::Status;

    #[test]
    fn every_status_has_a_message() {
        for code in 0..=10u32 {
            let status = Status::from_repr(code).unwrap();
            assert!(!describe(status).is_empty());
        }
    }
}
