use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::api::Backend;
use crate::notify::{read_answer, Answer, Notifier};
use crate::output::{self, OutputFormat};
use crate::session::{Session, DEACTIVATE_PROMPT};

pub const HELP: &str = "\
commands:
  list                     show the students on display
  reload                   clear the search and fetch students again
  search [TERM]            narrow the list (empty term shows all)
  edit RA                  load a student into the form (update mode)
  set FIELD VALUE          set a form field: name, ra, email, fee, active
  form                     show the form
  submit                   register or update, depending on the form mode
  reset                    clear the form and go back to register mode
  deactivate RA [-y]       deactivate a student
  notices                  list billing notices
  students                 list students available for notices
  notice open ID           open the notice dialog for a student id
  notice amount VALUE      set the notice amount
  notice due YYYY-MM-DD    set the notice due date
  notice show              show the notice dialog
  notice submit            generate the notice
  notice close             close the notice dialog
  help                     this text
  quit                     leave
";

#[derive(Clone, Debug, PartialEq)]
pub enum ShellCommand {
    Help,
    Quit,
    List,
    Reload,
    Search(String),
    Edit(String),
    Set { field: String, value: String },
    Form,
    Submit,
    Reset,
    Deactivate { ra: String, yes: bool },
    Notices,
    Students,
    NoticeOpen(i64),
    NoticeAmount(String),
    NoticeDue(String),
    NoticeShow,
    NoticeSubmit,
    NoticeClose,
}

fn split_first(input: &str) -> (&str, &str) {
    let input = input.trim();
    match input.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (input, ""),
    }
}

fn required<'a>(value: &'a str, usage: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("usage: {usage}"))
    } else {
        Ok(value)
    }
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let (head, rest) = split_first(line);
        let cmd = match head.to_lowercase().as_str() {
            "" => return Ok(None),
            "help" | "?" => Self::Help,
            "quit" | "exit" | "q" => Self::Quit,
            "list" | "ls" => Self::List,
            "reload" => Self::Reload,
            "search" | "filter" => Self::Search(rest.to_string()),
            "edit" => Self::Edit(required(rest, "edit RA")?.to_string()),
            "set" => {
                let (field, value) = split_first(rest);
                Self::Set {
                    field: required(field, "set FIELD VALUE")?.to_string(),
                    value: value.to_string(),
                }
            }
            "form" => Self::Form,
            "submit" | "save" => Self::Submit,
            "reset" | "new" => Self::Reset,
            "deactivate" => {
                let (ra, flag) = split_first(rest);
                Self::Deactivate {
                    ra: required(ra, "deactivate RA [-y]")?.to_string(),
                    yes: matches!(flag, "-y" | "--yes"),
                }
            }
            "notices" => Self::Notices,
            "students" => Self::Students,
            "notice" => {
                let (sub, arg) = split_first(rest);
                match sub.to_lowercase().as_str() {
                    "open" => {
                        let raw = required(arg, "notice open ID")?;
                        let id = raw
                            .parse::<i64>()
                            .map_err(|_| format!("invalid student id '{raw}'"))?;
                        Self::NoticeOpen(id)
                    }
                    "amount" => Self::NoticeAmount(required(arg, "notice amount VALUE")?.to_string()),
                    "due" => Self::NoticeDue(required(arg, "notice due YYYY-MM-DD")?.to_string()),
                    "show" | "" => Self::NoticeShow,
                    "submit" => Self::NoticeSubmit,
                    "close" => Self::NoticeClose,
                    other => return Err(format!("unknown notice command '{other}'")),
                }
            }
            other => return Err(format!("unknown command '{other}', try 'help'")),
        };
        Ok(Some(cmd))
    }
}

fn prompt<B: Backend, N: Notifier>(session: &Session<B, N>) -> String {
    match session.controller().mode() {
        crate::form::FormMode::Create => "boleto> ".to_string(),
        crate::form::FormMode::Edit { registration_code } => {
            format!("boleto [edit {registration_code}]> ")
        }
    }
}

/// Runs commands read from `input` until `quit` or end of input.
pub async fn run<B, N, R>(
    session: &mut Session<B, N>,
    input: R,
    format: OutputFormat,
    assume_yes: bool,
) -> Result<(), String>
where
    B: Backend,
    N: Notifier,
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    if session.load().await.is_ok() {
        print!("{}", output::render_students(&session.view(), format));
    }
    if let Ok(notices) = session.notices().await {
        print!("{}", output::render_notices(&notices, format));
    }

    loop {
        print!("{}", prompt(session));
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => return Err(format!("failed to read input: {e}")),
        };

        let cmd = match ShellCommand::parse(&line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };
        tracing::debug!(?cmd, "shell command");

        match cmd {
            ShellCommand::Help => print!("{HELP}"),
            ShellCommand::Quit => break,
            ShellCommand::List => {
                print!("{}", output::render_students(&session.view(), format))
            }
            ShellCommand::Reload => {
                if session.reload().await.is_ok() {
                    print!("{}", output::render_students(&session.view(), format));
                }
            }
            ShellCommand::Search(term) => {
                let hits = session.search(&term);
                print!("{}", output::render_students(&hits, format));
            }
            ShellCommand::Edit(ra) => {
                if session.edit(&ra).await.is_ok() {
                    let ctl = session.controller();
                    print!("{}", output::render_form(ctl.mode(), ctl.form()));
                }
            }
            ShellCommand::Set { field, value } => {
                if let Err(e) = session.controller_mut().form_mut().set_field(&field, &value) {
                    println!("{e}");
                }
            }
            ShellCommand::Form => {
                let ctl = session.controller();
                print!("{}", output::render_form(ctl.mode(), ctl.form()));
            }
            ShellCommand::Submit => {
                if session.submit().await.is_ok() {
                    print!("{}", output::render_students(&session.view(), format));
                }
            }
            ShellCommand::Reset => {
                session.reset();
                let ctl = session.controller();
                print!("{}", output::render_form(ctl.mode(), ctl.form()));
            }
            ShellCommand::Deactivate { ra, yes } => {
                let confirmed =
                    yes || assume_yes || read_answer(DEACTIVATE_PROMPT, &mut lines).await;
                if let Ok(crate::session::Deactivation::Done) =
                    session.deactivate(&ra, &Answer(confirmed)).await
                {
                    print!("{}", output::render_students(&session.view(), format));
                }
            }
            ShellCommand::Notices => {
                if let Ok(notices) = session.notices().await {
                    print!("{}", output::render_notices(&notices, format));
                }
            }
            ShellCommand::Students => {
                if let Ok(choices) = session.student_choices().await {
                    for (id, label) in choices {
                        println!("{id:>6}  {label}");
                    }
                }
            }
            ShellCommand::NoticeOpen(id) => match session.open_notice_dialog_for(id) {
                Ok(draft) => print!("{}", output::render_draft(draft)),
                Err(_) => println!("student id {id} is not in the current list"),
            },
            ShellCommand::NoticeAmount(value) => session.draft_mut().amount = value,
            ShellCommand::NoticeDue(value) => session.draft_mut().due_date = value,
            ShellCommand::NoticeShow => print!("{}", output::render_draft(session.draft())),
            ShellCommand::NoticeSubmit => {
                if let Ok(created) = session.submit_notice().await {
                    if let Some(listing) = created.listing {
                        print!("{}", output::render_notices(&listing, format));
                    }
                }
            }
            ShellCommand::NoticeClose => session.close_notice_dialog(),
        }
    }
    Ok(())
}
