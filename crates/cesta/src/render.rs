// SPDX-FileCopyrightText: 2026 Cesta Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Snapshot renderers for the interactive shell.
//!
//! Every function here is pure: it formats store snapshots into text and
//! never talks to the network. `render_after` decides which views to
//! reprint from the store events a command produced.

use cesta_core::{HistoryEntry, ItemFilter, ListItem, ListSummary, ShoppingList};
use cesta_store::{HistoryPhase, StoreEvent, Tab, Workspace};
use colored::Colorize;

/// Renders the active lists as an aligned table.
pub fn list_table(lists: &[ShoppingList]) -> String {
    if lists.is_empty() {
        return format!("{}\n", "no active lists (try: new <name>)".dimmed());
    }
    let mut out = format!("{}\n", "active lists".bold());
    for list in lists {
        // Timestamps are opaque server text; the date prefix is enough here.
        let created = list.created_at.get(..10).unwrap_or(&list.created_at);
        out.push_str(&format!(
            "  {:>4}  {:<28} {:>3} {}  {}\n",
            list.id,
            list.name,
            list.item_count,
            count_word(list.item_count),
            created.dimmed(),
        ));
    }
    out
}

/// Renders the open list's items, with any active filter and search noted
/// in the title.
pub fn item_view(
    list_name: &str,
    items: &[&ListItem],
    filter: ItemFilter,
    search: &str,
) -> String {
    let mut title = format!("items of {list_name}");
    if filter != ItemFilter::All {
        title.push_str(&format!(" [{filter}]"));
    }
    if !search.is_empty() {
        title.push_str(&format!(" [find: {search}]"));
    }
    let mut out = format!("{}\n", title.bold());
    if items.is_empty() {
        let hint = if filter != ItemFilter::All || !search.is_empty() {
            "no items match the current filter"
        } else {
            "no items yet (try: add <name> [qty])"
        };
        out.push_str(&format!("  {}\n", hint.dimmed()));
        return out;
    }
    for item in items {
        // Color only the fixed-width checkbox. Padding a colored name would
        // count the escape codes and break the columns.
        let checkbox = if item.purchased {
            "[x]".green().to_string()
        } else {
            "[ ]".to_string()
        };
        out.push_str(&format!(
            "  {checkbox} {:>4}  {:<28} x{}\n",
            item.id, item.name, item.quantity,
        ));
    }
    out
}

/// Renders the history entries with their item previews and a footer that
/// tracks the pagination phase.
pub fn history_view(entries: &[HistoryEntry], phase: HistoryPhase) -> String {
    let mut out = format!("{}\n", "history".bold());
    for entry in entries {
        let finalized = entry
            .finalized_at
            .as_deref()
            .and_then(|ts| ts.get(..10))
            .unwrap_or("-");
        out.push_str(&format!(
            "  {:>4}  {:<28} {:>3} {}  {}\n",
            entry.id,
            entry.name,
            entry.item_count,
            count_word(entry.item_count),
            finalized.dimmed(),
        ));
        for item in &entry.preview {
            let checkbox = if item.purchased { "[x]" } else { "[ ]" };
            out.push_str(&format!(
                "          {checkbox} {} x{}\n",
                item.name, item.quantity,
            ));
        }
        if entry.remaining() > 0 {
            out.push_str(&format!(
                "          {}\n",
                format!("(+{} more)", entry.remaining()).dimmed(),
            ));
        }
    }
    if entries.is_empty()
        && matches!(
            phase,
            HistoryPhase::LoadedWithMore | HistoryPhase::LoadedComplete
        )
    {
        out.push_str(&format!("  {}\n", "no finalized lists match".dimmed()));
    }
    out.push_str(&format!("  {}\n", history_footer(phase).dimmed()));
    out
}

fn history_footer(phase: HistoryPhase) -> &'static str {
    match phase {
        HistoryPhase::Idle => "not loaded (try: history)",
        HistoryPhase::Loading => "loading...",
        HistoryPhase::LoadedWithMore => "more available (try: more)",
        HistoryPhase::LoadedComplete => "end of history",
    }
}

/// One-line purchased/total readout for `summary <id>`.
pub fn summary_line(name: &str, summary: &ListSummary) -> String {
    format!(
        "{}: {} of {} purchased",
        name.bold(),
        summary.purchased,
        summary.items,
    )
}

/// Reprints the views a batch of store events invalidated. A tab change
/// redraws the whole tab; otherwise only the views whose stores changed.
pub fn render_after(workspace: &Workspace, events: &[StoreEvent]) -> String {
    let mut out = String::new();
    if events.contains(&StoreEvent::DetailClosed) {
        out.push_str(&format!("{}\n", "(list view closed)".dimmed()));
    }

    let tab_changed = events.contains(&StoreEvent::TabChanged);
    match workspace.tab() {
        Tab::Active => {
            if tab_changed || events.contains(&StoreEvent::ListsChanged) {
                out.push_str(&list_table(workspace.lists().lists()));
            }
            let items_dirty = tab_changed || events.contains(&StoreEvent::ItemsChanged);
            if items_dirty && let Some(detail) = workspace.detail() {
                let name = workspace
                    .lists()
                    .get(detail.list_id())
                    .map(|list| list.name.clone())
                    .unwrap_or_else(|| format!("list {}", detail.list_id()));
                let items = detail.filtered_items();
                out.push_str(&item_view(&name, &items, detail.filter(), detail.search()));
            }
        }
        Tab::History => {
            if tab_changed || events.contains(&StoreEvent::HistoryChanged) {
                out.push_str(&history_view(
                    workspace.history().entries(),
                    workspace.history().phase(),
                ));
            }
        }
    }
    out
}

fn count_word(count: u32) -> &'static str {
    if count == 1 { "item " } else { "items" }
}
