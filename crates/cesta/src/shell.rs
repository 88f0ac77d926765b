// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `cesta shell` command implementation.
//!
//! A readline loop over a [`ShellSession`]. Each line dispatches to one
//! workspace or client operation; the change events the operation emits
//! decide which views get reprinted afterwards.

use cesta_api::ApiClient;
use cesta_config::CestaConfig;
use cesta_core::{CestaError, ExportFormat, ItemFilter, ItemPatch, Period, Theme};
use cesta_store::{StoreEvent, Tab, Workspace};
use chrono::NaiveDate;
use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::auth;
use crate::render;

/// Runs the interactive shell until the user quits.
pub async fn run_shell(config: CestaConfig) -> Result<(), CestaError> {
    let client = auth::client_from_config(&config)?;
    let mut session = ShellSession::new(client, config.ui.history_page_size);

    let mut rl = DefaultEditor::new()
        .map_err(|e| CestaError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "cesta shell".bold().green());
    println!(
        "Type {} for commands, {} to exit.\n",
        "help".yellow(),
        "quit".yellow()
    );

    // First paint. A backend that wants a login answers 401 here, which is
    // a hint rather than a failure.
    match session.run_command("lists").await {
        Ok(out) => print!("{out}"),
        Err(CestaError::AuthRequired) => println!(
            "{}",
            "not signed in. Use `login` to sign in or `register` to create an account.".yellow()
        ),
        Err(e) => eprintln!("{}: {e}", "error".red()),
    }

    loop {
        match rl.readline(&format!("{}> ", "cesta".green())) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if line == "quit" || line == "exit" {
                    break;
                }
                let _ = rl.add_history_entry(line);
                match session.run_command(line).await {
                    Ok(out) => print!("{out}"),
                    Err(CestaError::AuthRequired) => {
                        println!("{}", "authentication required (try: login)".yellow());
                    }
                    Err(e) => eprintln!("{}: {e}", "error".red()),
                }
            }
            Err(ReadlineError::Interrupted) => break, // Ctrl+C
            Err(ReadlineError::Eof) => break,         // Ctrl+D
            Err(e) => {
                warn!(error = %e, "readline failed, leaving the shell");
                eprintln!("{}: {e}", "error".red());
                break;
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// One interactive session: a workspace, its event stream, and a client
/// handle for the operations that bypass the stores (auth, export, prefs).
pub struct ShellSession {
    workspace: Workspace,
    events: mpsc::Receiver<StoreEvent>,
    client: ApiClient,
}

impl ShellSession {
    pub fn new(client: ApiClient, history_page_size: u32) -> Self {
        let direct = client.clone();
        let (workspace, events) = Workspace::new(client, history_page_size);
        Self {
            workspace,
            events,
            client: direct,
        }
    }

    /// Executes one command line: dispatch, drain the change events it
    /// produced, then re-render the views those events touched.
    pub async fn run_command(&mut self, line: &str) -> Result<String, CestaError> {
        let status = self.dispatch(line).await;
        // Drain even on error so stale events never leak into a later render.
        let events = self.drain_events();
        let status = status?;
        let rendered = render::render_after(&self.workspace, &events);

        let mut out = String::new();
        if !status.is_empty() {
            out.push_str(&status);
            out.push('\n');
        }
        out.push_str(&rendered);
        Ok(out)
    }

    fn drain_events(&mut self) -> Vec<StoreEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.events.try_recv() {
            events.push(event);
        }
        events
    }

    async fn dispatch(&mut self, line: &str) -> Result<String, CestaError> {
        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };
        debug!(command = %command, "dispatching shell command");
        match command {
            "help" => Ok(help_text()),
            "lists" => self.cmd_lists().await,
            "new" => self.cmd_new(rest).await,
            "rename" => self.cmd_rename(rest).await,
            "delete" => self.cmd_delete(rest).await,
            "finalize" => self.cmd_finalize(rest, true).await,
            "reopen" => self.cmd_finalize(rest, false).await,
            "summary" => self.cmd_summary(rest).await,
            "export" => self.cmd_export(rest).await,
            "open" => self.cmd_open(rest).await,
            "close" => self.cmd_close(),
            "add" => self.cmd_add(rest).await,
            "toggle" => self.cmd_toggle(rest).await,
            "edit" => self.cmd_edit(rest).await,
            "rm" => self.cmd_rm(rest).await,
            "up" => self.cmd_move(rest, true).await,
            "down" => self.cmd_move(rest, false).await,
            "filter" => self.cmd_filter(rest),
            "find" => self.cmd_find(rest).await,
            "history" => self.cmd_history().await,
            "more" => self.cmd_more().await,
            "period" => self.cmd_period(rest).await,
            "from" => self.cmd_date(rest, true).await,
            "to" => self.cmd_date(rest, false).await,
            "restore" => self.cmd_restore(rest).await,
            "duplicate" => self.cmd_duplicate(rest).await,
            "theme" => self.cmd_theme(rest).await,
            "login" => self.cmd_login(rest).await,
            "register" => self.cmd_register().await,
            "logout" => self.cmd_logout().await,
            "whoami" => self.cmd_whoami().await,
            _ => Err(CestaError::Validation(format!(
                "unknown command: {command} (try: help)"
            ))),
        }
    }

    // --- List commands ---

    async fn cmd_lists(&mut self) -> Result<String, CestaError> {
        if self.workspace.tab() != Tab::Active {
            self.workspace.switch_tab(Tab::Active).await?;
        }
        self.workspace.refresh_lists().await?;
        Ok(String::new())
    }

    async fn cmd_new(&mut self, rest: &str) -> Result<String, CestaError> {
        if rest.is_empty() {
            return Err(CestaError::Validation("usage: new <name>".to_string()));
        }
        let created = self.workspace.create_list(rest).await?;
        Ok(format!("created list {} ({})", created.id, created.name))
    }

    async fn cmd_rename(&mut self, rest: &str) -> Result<String, CestaError> {
        const USAGE: &str = "usage: rename <list-id> <name>";
        let (id, name) = split_id_and_text(rest, USAGE)?;
        if name.is_empty() {
            return Err(CestaError::Validation(USAGE.to_string()));
        }
        let renamed = self.workspace.rename_list(id, name).await?;
        Ok(format!("renamed list {} to {}", renamed.id, renamed.name))
    }

    async fn cmd_delete(&mut self, rest: &str) -> Result<String, CestaError> {
        let id = parse_id(rest, "usage: delete <list-id>")?;
        self.workspace.delete_list(id).await?;
        Ok(format!("deleted list {id}"))
    }

    async fn cmd_finalize(&mut self, rest: &str, finalized: bool) -> Result<String, CestaError> {
        let usage = if finalized {
            "usage: finalize <list-id>"
        } else {
            "usage: reopen <list-id>"
        };
        let id = parse_id(rest, usage)?;
        let updated = self.workspace.finalize_list(id, finalized).await?;
        Ok(if finalized {
            format!("finalized {} (find it under history)", updated.name)
        } else {
            format!("reopened {}", updated.name)
        })
    }

    async fn cmd_summary(&mut self, rest: &str) -> Result<String, CestaError> {
        let id = parse_id(rest, "usage: summary <list-id>")?;
        let summary = self.workspace.lists().summary(id).await?;
        let name = self
            .workspace
            .lists()
            .get(id)
            .map(|list| list.name.clone())
            .unwrap_or_else(|| format!("list {id}"));
        Ok(render::summary_line(&name, &summary))
    }

    async fn cmd_export(&mut self, rest: &str) -> Result<String, CestaError> {
        const USAGE: &str = "usage: export <list-id> [txt|csv]";
        let mut parts = rest.split_whitespace();
        let id = parse_id(parts.next().unwrap_or(""), USAGE)?;
        let format = match parts.next() {
            Some(raw) => raw.parse::<ExportFormat>().map_err(|_| {
                CestaError::Validation(format!("unknown export format: {raw} (use txt or csv)"))
            })?,
            None => ExportFormat::Txt,
        };
        let payload = self.client.export_list(id, format).await?;
        tokio::fs::write(&payload.filename, &payload.bytes)
            .await
            .map_err(|e| {
                CestaError::Internal(format!("failed to write {}: {e}", payload.filename))
            })?;
        Ok(format!(
            "wrote {} ({} bytes)",
            payload.filename,
            payload.bytes.len()
        ))
    }

    // --- Item commands (need an open list) ---

    async fn cmd_open(&mut self, rest: &str) -> Result<String, CestaError> {
        let id = parse_id(rest, "usage: open <list-id>")?;
        if self.workspace.tab() != Tab::Active {
            self.workspace.switch_tab(Tab::Active).await?;
        }
        self.workspace.open_detail(id).await?;
        Ok(String::new())
    }

    fn cmd_close(&mut self) -> Result<String, CestaError> {
        if self.workspace.detail().is_none() {
            return Err(CestaError::Validation("no list is open".to_string()));
        }
        self.workspace.close_detail();
        Ok(String::new())
    }

    async fn cmd_add(&mut self, rest: &str) -> Result<String, CestaError> {
        if rest.is_empty() {
            return Err(CestaError::Validation("usage: add <name> [qty]".to_string()));
        }
        let (name, quantity) = split_name_and_quantity(rest);
        let created = self.workspace.create_item(name, quantity).await?;
        Ok(format!("added {} x{}", created.name, created.quantity))
    }

    async fn cmd_toggle(&mut self, rest: &str) -> Result<String, CestaError> {
        let id = parse_id(rest, "usage: toggle <item-id>")?;
        self.workspace.toggle_item(id).await?;
        Ok(String::new())
    }

    async fn cmd_edit(&mut self, rest: &str) -> Result<String, CestaError> {
        const USAGE: &str = "usage: edit <item-id> name <text> | edit <item-id> qty <n>";
        let (id, rest) = split_id_and_text(rest, USAGE)?;
        let (field, value) = match rest.split_once(char::is_whitespace) {
            Some((field, value)) => (field, value.trim()),
            None => (rest, ""),
        };
        let patch = match field {
            "name" if !value.is_empty() => ItemPatch::rename(value),
            "qty" if !value.is_empty() => {
                let quantity = value
                    .parse::<u32>()
                    .map_err(|_| CestaError::Validation(format!("not a quantity: {value}")))?;
                ItemPatch::quantity(quantity)
            }
            _ => return Err(CestaError::Validation(USAGE.to_string())),
        };
        self.workspace.update_item(id, &patch).await?;
        Ok(format!("updated item {id}"))
    }

    async fn cmd_rm(&mut self, rest: &str) -> Result<String, CestaError> {
        let id = parse_id(rest, "usage: rm <item-id>")?;
        self.workspace.delete_item(id).await?;
        Ok(format!("removed item {id}"))
    }

    async fn cmd_move(&mut self, rest: &str, up: bool) -> Result<String, CestaError> {
        let usage = if up {
            "usage: up <item-id>"
        } else {
            "usage: down <item-id>"
        };
        let id = parse_id(rest, usage)?;
        let moved = if up {
            self.workspace.move_item_up(id).await?
        } else {
            self.workspace.move_item_down(id).await?
        };
        Ok(if moved {
            String::new()
        } else {
            "already at the edge".dimmed().to_string()
        })
    }

    fn cmd_filter(&mut self, rest: &str) -> Result<String, CestaError> {
        let filter = rest.parse::<ItemFilter>().map_err(|_| {
            CestaError::Validation("usage: filter todos|comprados|pendentes".to_string())
        })?;
        self.workspace.set_item_filter(filter)?;
        Ok(String::new())
    }

    /// `find` narrows whichever tab is in front: the open list's items on
    /// the active tab, the archive on the history tab.
    async fn cmd_find(&mut self, rest: &str) -> Result<String, CestaError> {
        match self.workspace.tab() {
            Tab::Active => self.workspace.set_item_search(rest)?,
            Tab::History => self.workspace.set_history_search(rest).await?,
        }
        Ok(String::new())
    }

    // --- History commands ---

    async fn cmd_history(&mut self) -> Result<String, CestaError> {
        self.workspace.switch_tab(Tab::History).await?;
        Ok(String::new())
    }

    async fn cmd_more(&mut self) -> Result<String, CestaError> {
        self.require_history_tab("more")?;
        let fetched = self.workspace.load_more_history().await?;
        Ok(if fetched {
            String::new()
        } else {
            "nothing more to load".dimmed().to_string()
        })
    }

    async fn cmd_period(&mut self, rest: &str) -> Result<String, CestaError> {
        self.require_history_tab("period")?;
        let period = rest.parse::<Period>().map_err(|_| {
            CestaError::Validation("usage: period todos|7d|30d|90d|custom".to_string())
        })?;
        self.workspace.set_history_period(period).await?;
        Ok(String::new())
    }

    async fn cmd_date(&mut self, rest: &str, is_from: bool) -> Result<String, CestaError> {
        let command = if is_from { "from" } else { "to" };
        self.require_history_tab(command)?;
        let date = match rest {
            "" | "clear" => None,
            raw => Some(
                NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
                    CestaError::Validation(format!("not a date: {raw} (use YYYY-MM-DD)"))
                })?,
            ),
        };
        if is_from {
            self.workspace.set_history_from(date).await?;
        } else {
            self.workspace.set_history_to(date).await?;
        }
        Ok(String::new())
    }

    async fn cmd_restore(&mut self, rest: &str) -> Result<String, CestaError> {
        let (id, name) = split_id_and_text(rest, "usage: restore <entry-id> [new name]")?;
        let name = (!name.is_empty()).then_some(name);
        let restored = self.workspace.restore(id, name).await?;
        Ok(format!(
            "restored as list {} ({})",
            restored.id, restored.name
        ))
    }

    async fn cmd_duplicate(&mut self, rest: &str) -> Result<String, CestaError> {
        let (id, name) = split_id_and_text(rest, "usage: duplicate <entry-id> [new name]")?;
        let name = (!name.is_empty()).then_some(name);
        let cloned = self.workspace.duplicate(id, name).await?;
        Ok(format!("duplicated as list {} ({})", cloned.id, cloned.name))
    }

    // --- Account commands ---

    async fn cmd_theme(&mut self, rest: &str) -> Result<String, CestaError> {
        if rest.is_empty() {
            let prefs = self.client.get_prefs().await?;
            return Ok(format!("theme: {}", prefs.theme));
        }
        let theme = rest
            .parse::<Theme>()
            .map_err(|_| CestaError::Validation("usage: theme [claro|escuro]".to_string()))?;
        let prefs = self.client.set_prefs(theme).await?;
        Ok(format!("theme set to {}", prefs.theme))
    }

    async fn cmd_login(&mut self, rest: &str) -> Result<String, CestaError> {
        let email = if rest.is_empty() {
            auth::prompt_line("email: ")?
        } else {
            rest.to_string()
        };
        auth::validate_email(&email)?;
        let password = auth::prompt_password("password: ")?;
        auth::validate_password(&password)?;
        self.client.login(&email, &password).await?;
        self.workspace.refresh_lists().await?;
        Ok(format!("signed in as {email}"))
    }

    async fn cmd_register(&mut self) -> Result<String, CestaError> {
        let name = auth::prompt_line("name: ")?;
        if name.is_empty() {
            return Err(CestaError::Validation("a name is required".to_string()));
        }
        let email = auth::prompt_line("email: ")?;
        auth::validate_email(&email)?;
        let password = auth::prompt_password("password: ")?;
        auth::validate_password(&password)?;
        self.client.register(&name, &email, &password).await?;
        self.client.login(&email, &password).await?;
        self.workspace.refresh_lists().await?;
        Ok(format!("account created; signed in as {email}"))
    }

    async fn cmd_logout(&mut self) -> Result<String, CestaError> {
        self.client.logout().await?;
        Ok("signed out".to_string())
    }

    async fn cmd_whoami(&mut self) -> Result<String, CestaError> {
        match self.client.me().await {
            Ok(account) => Ok(format!("{} <{}>", account.name, account.email)),
            Err(CestaError::AuthRequired) => Ok("not signed in".to_string()),
            Err(e) => Err(e),
        }
    }

    fn require_history_tab(&self, command: &str) -> Result<(), CestaError> {
        if self.workspace.tab() != Tab::History {
            return Err(CestaError::Validation(format!(
                "{command} only applies to the history tab (try: history)"
            )));
        }
        Ok(())
    }
}

fn parse_id(raw: &str, usage: &str) -> Result<i64, CestaError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| CestaError::Validation(usage.to_string()))
}

/// Splits `"7 rest of line"` into an id and the remaining text. The text
/// may be empty for commands with an optional tail.
fn split_id_and_text<'a>(rest: &'a str, usage: &str) -> Result<(i64, &'a str), CestaError> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Err(CestaError::Validation(usage.to_string()));
    }
    match rest.split_once(char::is_whitespace) {
        Some((id_raw, text)) => Ok((parse_id(id_raw, usage)?, text.trim())),
        None => Ok((parse_id(rest, usage)?, "")),
    }
}

/// `"Leite 2"` becomes `("Leite", 2)`; a line with no trailing number is
/// all name, quantity 1.
fn split_name_and_quantity(rest: &str) -> (&str, u32) {
    let rest = rest.trim();
    if let Some((name, qty_raw)) = rest.rsplit_once(char::is_whitespace)
        && let Ok(quantity) = qty_raw.parse::<u32>()
    {
        return (name.trim_end(), quantity);
    }
    (rest, 1)
}

fn help_text() -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", "lists".bold()));
    out.push_str("  lists                     show the active lists (refreshes from the server)\n");
    out.push_str("  new <name>                create a list\n");
    out.push_str("  rename <id> <name>        rename a list\n");
    out.push_str("  delete <id>               delete a list\n");
    out.push_str("  finalize <id>             archive a list into the history\n");
    out.push_str("  reopen <id>               bring a finalized list back\n");
    out.push_str("  summary <id>              purchased/total counts for a list\n");
    out.push_str("  export <id> [txt|csv]     write the list to a file\n");
    out.push_str(&format!("{}\n", "items".bold()));
    out.push_str("  open <id>                 open a list's items\n");
    out.push_str("  close                     close the open list\n");
    out.push_str("  add <name> [qty]          add an item\n");
    out.push_str("  toggle <item-id>          flip an item's purchased flag\n");
    out.push_str("  edit <item-id> name <text>  rename an item\n");
    out.push_str("  edit <item-id> qty <n>    change an item's quantity\n");
    out.push_str("  rm <item-id>              remove an item\n");
    out.push_str("  up/down <item-id>         move an item one position\n");
    out.push_str("  filter todos|comprados|pendentes  narrow the item view\n");
    out.push_str("  find [text]               search by name (empty clears)\n");
    out.push_str(&format!("{}\n", "history".bold()));
    out.push_str("  history                   switch to the finalized lists\n");
    out.push_str("  more                      fetch the next history page\n");
    out.push_str("  period todos|7d|30d|90d|custom  narrow by finalization date\n");
    out.push_str("  from/to YYYY-MM-DD        custom period bounds (`clear` resets)\n");
    out.push_str("  restore <id> [name]       bring an entry back to the active lists\n");
    out.push_str("  duplicate <id> [name]     clone an entry into a new list\n");
    out.push_str(&format!("{}\n", "account".bold()));
    out.push_str("  login [email]             sign in\n");
    out.push_str("  register                  create an account\n");
    out.push_str("  logout                    sign out\n");
    out.push_str("  whoami                    show the signed-in account\n");
    out.push_str("  theme [claro|escuro]      show or set the saved theme\n");
    out.push_str(&format!("{}\n", "shell".bold()));
    out.push_str("  help                      this text\n");
    out.push_str("  quit                      leave the shell\n");
    out
}
