use colored::{ColoredString, Colorize};
use dialoguer::{Confirm, Input};

use moneta_core::CategoryKind;
use moneta_reconcile::{
    CategoryTree, PickerOutcome, PickerView, Prompt, ReconcileRow, RowStatus, Selection,
    TreePicker,
};

/// Terminal implementation of the engine's prompt port.
pub struct CliPrompt;

impl Prompt for CliPrompt {
    fn confirm_transfer(&mut self, rows: &[&ReconcileRow]) -> bool {
        println!("\nDo you want to add the following recognized entries?");
        for row in rows {
            println!("{}", row_line(row, "recognized").blue());
        }
        confirm("Add them to the wallet")
    }

    fn confirm_manual(&mut self, rows: &[&ReconcileRow]) -> bool {
        println!(
            "\nWould you like to add the {} remaining transactions manually?",
            rows.len()
        );
        for row in rows {
            println!("{}", row_line(row, "requires manual entry").red());
        }
        confirm("Walk through them")
    }

    fn choose_kind(&mut self, row: &ReconcileRow) -> Option<CategoryKind> {
        println!("\nProcessing:");
        println!("{}", row_line(row, ""));
        loop {
            let Ok(input) = Input::<String>::new()
                .with_prompt("(e)xpense, (i)ncome, (d)ebt/loan, or (s)kip")
                .interact_text()
            else {
                return None;
            };
            match input.trim().to_lowercase().as_str() {
                "e" => return Some(CategoryKind::Expense),
                "i" => return Some(CategoryKind::Income),
                "d" => return Some(CategoryKind::DebtLoan),
                "s" => {
                    println!("Skipping transaction");
                    return None;
                }
                _ => invalid_input(),
            }
        }
    }

    fn choose_category(&mut self, tree: &CategoryTree) -> Option<String> {
        pick_category(tree)
    }

    fn note_for(&mut self, _row: &ReconcileRow) -> String {
        Input::<String>::new()
            .with_prompt("Write a transaction note")
            .allow_empty(true)
            .interact_text()
            .unwrap_or_default()
    }
}

/// Runs the two-level category descent against the terminal.
pub fn pick_category(tree: &CategoryTree) -> Option<String> {
    if tree.is_empty() {
        println!("No categories available");
        return None;
    }

    let mut picker = TreePicker::new(tree);
    loop {
        render(&picker.view());
        let Ok(input) = Input::<String>::new()
            .with_prompt(">>")
            .allow_empty(true)
            .interact_text()
        else {
            return None;
        };
        let Some(selection) = Selection::parse(&input) else {
            invalid_input();
            continue;
        };
        match picker.feed(selection) {
            PickerOutcome::Pending => {}
            PickerOutcome::Selected(name) => return Some(name),
            PickerOutcome::Skipped => {
                println!("Skipping transaction");
                return None;
            }
        }
    }
}

fn render(view: &PickerView) {
    match view {
        PickerView::Parents(parents) => {
            println!("\nAvailable categories:");
            for (index, (name, child_count)) in parents.iter().enumerate() {
                if *child_count > 0 {
                    println!("{index:3}: {name} ({child_count} sub-categories)");
                } else {
                    println!("{index:3}: {name}");
                }
            }
            println!("\nType a category number, or 's' to skip this transaction");
        }
        PickerView::Children { parent, children } => {
            println!("\nSub-categories of {parent}:");
            for (index, name) in children.iter().enumerate() {
                println!("{index:3}: {name}");
            }
            println!(
                "\nType a sub-category number, 'b' to go back, or Enter to use {parent:?}"
            );
        }
    }
}

/// One line per statement row, colored by its terminal status.
pub fn print_report(rows: &[ReconcileRow]) {
    for row in rows {
        println!("{}", status_line(row));
    }
}

fn status_line(row: &ReconcileRow) -> ColoredString {
    match row.status() {
        RowStatus::InLedger => row_line(row, "In wallet").green(),
        RowStatus::AutoMatched => row_line(row, "Recognized").blue(),
        RowStatus::RequiresManualEntry => row_line(row, "Requires manual entry").red(),
    }
}

/// `index: name: date : ±amount : status`, name clipped to 40 columns.
pub fn row_line(row: &ReconcileRow, text: &str) -> String {
    let tx = &row.transaction;
    let name: String = if tx.name.chars().count() > 40 {
        let clipped: String = tx.name.chars().take(36).collect();
        format!("{clipped}...")
    } else {
        tx.name.clone()
    };
    format!(
        "{:2}: {:40}: {} : {}{:>10} : {}",
        row.index,
        name,
        tx.date.format("%d-%m-%Y"),
        tx.direction.sign(),
        tx.amount.to_string(),
        text
    )
}

fn confirm(prompt: &str) -> bool {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .unwrap_or(false)
}

fn invalid_input() {
    println!("{}", "Sorry, the input is not valid".red());
}
