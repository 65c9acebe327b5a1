//! # Terminal Session
//!
//! A line-oriented renderer for the wizard. It draws the descriptor list as
//! text and turns commands back into controller calls through
//! [`WizardController::handle`], the same path a graphical renderer would
//! take.
//!
//! Commands:
//!
//! ```text
//! show                  redraw the form
//! subject <text>        set the subject name
//! question <text>       set the current question
//! option <1-4> <text>   set an option (clears the answer)
//! answer <text>         pick the answer
//! note <1-2> <text>     set a note
//! next | prev           move between steps
//! submit                validate and save
//! reset                 clear the whole form
//! quit                  leave without saving
//! ```

use crate::error::AppError;
use exam_author_core::{
    Binding, ControlKind, ExamSubmitter, FieldDescriptor, FieldId, FieldInput, NOTE_COUNT,
    OPTIONS_PER_QUESTION, SubmitError, SubmitOutcome, TokenProvider, WizardController, describe,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, trace};

const HELP: &str = "\
commands:
  show                  redraw the form
  subject <text>        set the subject name
  question <text>       set the current question
  option <1-4> <text>   set an option (clears the answer)
  answer <text>         pick the answer
  note <1-2> <text>     set a note
  next | prev           move between steps
  submit                validate and save
  reset                 clear the whole form
  quit                  leave without saving
";

// =============================================================================
// COMMANDS
// =============================================================================

/// One parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show,
    Edit(Binding, String),
    Click(Binding),
    Submit,
    Reset,
    Help,
    Quit,
}

/// Split off the first word; the remainder is trimmed.
fn split_word(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}

/// Parse a 1-based position followed by text.
fn positional(rest: &str, count: usize) -> Result<(usize, String), String> {
    let (number, text) = split_word(rest);
    let position: usize = number
        .parse()
        .map_err(|_| format!("expected a number from 1 to {count}"))?;
    if position == 0 || position > count {
        return Err(format!("expected a number from 1 to {count}, got {position}"));
    }
    Ok((position - 1, text.to_string()))
}

pub fn parse_command(line: &str) -> Result<Command, String> {
    let (word, rest) = split_word(line.trim());
    match word {
        "show" => Ok(Command::Show),
        "subject" => Ok(Command::Edit(Binding::Subject, rest.to_string())),
        "question" => Ok(Command::Edit(Binding::QuestionText, rest.to_string())),
        "option" => {
            let (position, text) = positional(rest, OPTIONS_PER_QUESTION)?;
            Ok(Command::Edit(Binding::Option(position), text))
        }
        "answer" => Ok(Command::Edit(Binding::Answer, rest.to_string())),
        "note" => {
            let (index, text) = positional(rest, NOTE_COUNT)?;
            Ok(Command::Edit(Binding::Note(index), text))
        }
        "next" => Ok(Command::Click(Binding::Next)),
        "prev" | "previous" => Ok(Command::Click(Binding::Previous)),
        "submit" => Ok(Command::Submit),
        "reset" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(format!("unknown command: {other} (try `help`)")),
    }
}

// =============================================================================
// RENDERING
// =============================================================================

fn row_label(field: &FieldDescriptor) -> &str {
    match field.id {
        FieldId::Option { .. } | FieldId::Note(_) => {
            field.placeholder.as_deref().unwrap_or(&field.label)
        }
        _ => &field.label,
    }
}

/// Draw the descriptor list. A shared error (options, notes) is printed once.
pub fn render(fields: &[FieldDescriptor]) -> String {
    let mut out = String::new();
    let mut last_error: Option<&str> = None;

    for field in fields {
        let value = if field.value.is_empty() {
            "-"
        } else {
            field.value.as_str()
        };
        let row = match &field.kind {
            ControlKind::TextInput => format!("{:<18} {}", row_label(field), value),
            ControlKind::SingleSelect { choices } => {
                format!("{:<18} {} [{}]", row_label(field), value, choices.join(" | "))
            }
            ControlKind::Button { disabled } => {
                let state = if *disabled { " (disabled)" } else { "" };
                format!("<{}>{}", field.label, state)
            }
        };
        out.push_str(&row);
        out.push('\n');

        let error = field.error.as_deref();
        if let Some(message) = error {
            if error != last_error {
                out.push_str(&format!("  ! {message}\n"));
            }
        }
        last_error = error;
    }
    out
}

// =============================================================================
// SESSION LOOP
// =============================================================================

/// How a session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEnd {
    Submitted(SubmitOutcome),
    Quit,
    /// Input closed.
    Eof,
}

async fn write_str<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> std::io::Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await
}

/// Error shown next to the control bound to `binding`, if any.
fn field_error(ctrl: &WizardController, binding: Binding) -> Option<String> {
    describe(ctrl.state())
        .into_iter()
        .find(|field| field.handler == binding)
        .and_then(|field| field.error)
}

/// Drive `ctrl` from `input` until the author quits, submits, or input ends.
pub async fn run_session<R, W, S, T>(
    ctrl: &mut WizardController,
    mut input: R,
    mut output: W,
    submitter: &S,
    tokens: &T,
) -> Result<SessionEnd, AppError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: ExamSubmitter,
    T: TokenProvider,
{
    let watcher = ctrl.subscribe(|state| {
        trace!(
            step = state.current_step.get(),
            completed = state.completed_steps(),
            submitting = state.submitting,
            "form state changed"
        );
    });

    write_str(&mut output, &render(&describe(ctrl.state()))).await?;

    let mut line = String::new();
    let end = loop {
        write_str(&mut output, &format!("[{}]> ", ctrl.current_step())).await?;
        line.clear();
        if input.read_line(&mut line).await? == 0 {
            break SessionEnd::Eof;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                write_str(&mut output, &format!("error: {message}\n")).await?;
                continue;
            }
        };
        debug!(?command, "session command");

        match command {
            Command::Show => {
                write_str(&mut output, &render(&describe(ctrl.state()))).await?;
            }
            Command::Edit(binding, value) => {
                ctrl.handle(binding, FieldInput::Change(value));
                if let Some(message) = field_error(ctrl, binding) {
                    write_str(&mut output, &format!("  ! {message}\n")).await?;
                }
            }
            Command::Click(binding) => {
                if ctrl.handle(binding, FieldInput::Click) {
                    write_str(&mut output, &render(&describe(ctrl.state()))).await?;
                } else {
                    let mut text = String::from("cannot move from this step\n");
                    for (key, error) in &ctrl.state().field_errors {
                        text.push_str(&format!("  {key}: {error}\n"));
                    }
                    write_str(&mut output, &text).await?;
                }
            }
            Command::Submit => {
                let result = ctrl
                    .submit(submitter, tokens, || debug!("leaving the form"))
                    .await;
                match result {
                    Ok(outcome) => {
                        let text = match &outcome {
                            SubmitOutcome::Created => "exam created\n".to_string(),
                            SubmitOutcome::Updated(id) => format!("exam {id} updated\n"),
                        };
                        write_str(&mut output, &text).await?;
                        break SessionEnd::Submitted(outcome);
                    }
                    Err(SubmitError::Invalid(report)) => {
                        let mut text = String::from("not ready to submit\n");
                        for (key, error) in report.iter() {
                            text.push_str(&format!("  {key}: {error}\n"));
                        }
                        write_str(&mut output, &text).await?;
                    }
                    Err(err) => {
                        write_str(&mut output, &format!("error: {err}\n")).await?;
                    }
                }
            }
            Command::Reset => {
                ctrl.reset();
                write_str(&mut output, "form cleared\n").await?;
                write_str(&mut output, &render(&describe(ctrl.state()))).await?;
            }
            Command::Help => write_str(&mut output, HELP).await?,
            Command::Quit => break SessionEnd::Quit,
        }
    };

    ctrl.unsubscribe(watcher);
    Ok(end)
}

// =============================================================================
// TESTS
// =============================================================================
