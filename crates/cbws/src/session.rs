//! Interactive prompt over a loaded document.
//!
//! All format knowledge stays in `cbws-format`; this module only renders
//! query results and collects edit parameters.

use anyhow::Result;
use cbws_format::{AttributeEdit, CbwsError, Document, Group};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

const MENU: &str = "
Options:
     1: Display file hex.
     2: Display translated file info.
     3: Display file header.
     4: Display first frame functions.
     5: Display intermediate functions.
     6: Display final frame functions.
     7: Display impact frame functions (there may be none).
     8: Modify a function attribute.
     9: Set a function frame.
    10: Reorder an intermediate function.
    11: Remove an intermediate function.
    12: Set the frame delay.
    13: Save the function list (rebuild and rewrite the file).

    99: Exit the program.
";

/// Run the interactive loop until the user exits.
pub fn run(doc: &mut Document) -> Result<()> {
    let mut editor = DefaultEditor::new()?;
    loop {
        println!("{MENU}");
        let Some(selection) = prompt_usize(&mut editor, "Enter a selection: ")? else {
            return Ok(());
        };
        match selection {
            1 => println!("{}", doc.hex()),
            2 => print_file_info(doc),
            3 => print_header(doc),
            4 => print_group(doc, Group::FirstFrame),
            5 => print_group(doc, Group::Intermediate),
            6 => print_group(doc, Group::FinalFrame),
            7 => print_group(doc, Group::ImpactFrame),
            8 => report(modify_attribute(&mut editor, doc)?)?,
            9 => report(set_frame(&mut editor, doc)?)?,
            10 => report(reorder_intermediate(&mut editor, doc)?)?,
            11 => report(remove_intermediate(&mut editor, doc)?)?,
            12 => report(set_frame_delay(&mut editor, doc)?)?,
            13 => report(doc.persist())?,
            99 => return Ok(()),
            _ => {}
        }
    }
}

/// Print the header and every function with its attributes.
pub fn print_file_info(doc: &Document) {
    print_header(doc);
    for group in Group::ALL {
        print_group(doc, group);
    }
}

fn print_header(doc: &Document) {
    let header = doc.header();
    println!("Header Info");
    println!("    File Type: {}", header.file_type());
    println!("    Unknown Header Value: {}", header.unknown_value);
    println!("    Function Count: {}", header.function_count);
    println!("    Frame Delay: {}", header.frame_delay);
}

fn print_group(doc: &Document, group: Group) {
    let functions = doc.functions(group);
    println!("{} functions: {}", group, functions.len());
    for (index, function) in functions.iter().enumerate() {
        println!(
            "{:2}. {} (frame {}, {} bytes)",
            index,
            function.label(),
            function.local_frame(),
            function.len()
        );
        for (attr_index, attr) in doc.attributes(group, index).iter().enumerate() {
            println!("        {:2}. {}", attr_index, attr);
        }
    }
}

/// Surface a recoverable core error as a diagnostic; I/O failure is fatal.
fn report(result: Result<(), CbwsError>) -> Result<()> {
    match result {
        Ok(()) => {
            println!("Done.");
            Ok(())
        }
        Err(err @ CbwsError::Io(_)) => Err(err.into()),
        Err(err) => {
            println!("{err}");
            Ok(())
        }
    }
}

fn modify_attribute(editor: &mut DefaultEditor, doc: &mut Document) -> Result<Result<(), CbwsError>> {
    let Some(group) = prompt_group(editor)? else {
        return Ok(Ok(()));
    };
    let Some(index) = prompt_usize(editor, "Enter the function index: ")? else {
        return Ok(Ok(()));
    };

    let attrs = doc.attributes(group, index);
    if attrs.is_empty() {
        println!("No attributes identified for that function.");
        return Ok(Ok(()));
    }
    for (attr_index, attr) in attrs.iter().enumerate() {
        println!("    {:2}. {}", attr_index, attr);
    }
    let Some(attr_index) = prompt_usize(editor, "Enter the attribute index: ")? else {
        return Ok(Ok(()));
    };
    let Some(attr) = attrs.get(attr_index) else {
        println!("Invalid index: {attr_index}");
        return Ok(Ok(()));
    };

    let edit = match attr.name.as_str() {
        "Hit Reaction" => {
            let Some(edit) = prompt_reaction(editor, doc)? else {
                return Ok(Ok(()));
            };
            edit
        }
        "Guard Break" => {
            let Some(enable) = prompt_yes_no(editor, "Enable guard break?")? else {
                return Ok(Ok(()));
            };
            AttributeEdit::Flag(enable)
        }
        _ => {
            println!("Current value: {}", attr.value);
            let Some(value) = prompt_f32(editor, "Enter new value: ")? else {
                return Ok(Ok(()));
            };
            AttributeEdit::Number(value)
        }
    };

    Ok(doc.modify_attribute(group, index, attr_index, &edit))
}

fn prompt_reaction(
    editor: &mut DefaultEditor,
    doc: &Document,
) -> Result<Option<AttributeEdit>> {
    let names: Vec<&str> = doc.catalog().reactions.names().collect();
    let selection = loop {
        println!("Hit Reactions:");
        for (index, name) in names.iter().enumerate() {
            println!("    {:2}. {}", index, name);
        }
        println!();
        let Some(selection) = prompt_usize(editor, "Enter number for hit reaction selection: ")?
        else {
            return Ok(None);
        };
        if selection < names.len() {
            break selection;
        }
    };

    let name = names[selection].to_string();
    // Only Slam Down and Generic Light Reaction carry the discriminator.
    let bounce = if matches!(name.as_str(), "Slam Down" | "Generic Light Reaction") {
        match prompt_yes_no(editor, "Enable bounce?")? {
            Some(choice) => choice,
            None => return Ok(None),
        }
    } else {
        false
    };

    Ok(Some(AttributeEdit::Reaction { name, bounce }))
}

fn set_frame(editor: &mut DefaultEditor, doc: &mut Document) -> Result<Result<(), CbwsError>> {
    let Some(group) = prompt_group(editor)? else {
        return Ok(Ok(()));
    };
    let Some(index) = prompt_usize(editor, "Enter the function index: ")? else {
        return Ok(Ok(()));
    };
    let Some(frame) = prompt_i8(editor, "Enter the new frame number: ")? else {
        return Ok(Ok(()));
    };
    Ok(doc.set_local_frame(group, index, frame))
}

fn reorder_intermediate(
    editor: &mut DefaultEditor,
    doc: &mut Document,
) -> Result<Result<(), CbwsError>> {
    let Some(old_index) = prompt_usize(editor, "Enter the current index: ")? else {
        return Ok(Ok(()));
    };
    let Some(new_index) = prompt_usize(editor, "Enter the new index: ")? else {
        return Ok(Ok(()));
    };
    let moved = doc.reorder_intermediate(old_index, new_index);
    if moved.is_ok() {
        println!("Reordered in memory; save to write the new order to the file.");
    }
    Ok(moved)
}

fn remove_intermediate(
    editor: &mut DefaultEditor,
    doc: &mut Document,
) -> Result<Result<(), CbwsError>> {
    let Some(index) = prompt_usize(editor, "Enter the function index: ")? else {
        return Ok(Ok(()));
    };
    let removed = doc.remove_intermediate(index);
    if removed.is_ok() {
        println!("Removed in memory; save to write the new list to the file.");
    }
    Ok(removed)
}

fn set_frame_delay(
    editor: &mut DefaultEditor,
    doc: &mut Document,
) -> Result<Result<(), CbwsError>> {
    let Some(value) = prompt_u32(editor, "Enter the new frame delay: ")? else {
        return Ok(Ok(()));
    };
    Ok(doc.set_frame_delay(value))
}

fn prompt_group(editor: &mut DefaultEditor) -> Result<Option<Group>> {
    loop {
        for (index, group) in Group::ALL.iter().enumerate() {
            println!("    {}: {}", index + 1, group);
        }
        let Some(selection) = prompt_usize(editor, "Enter a group: ")? else {
            return Ok(None);
        };
        match selection {
            1 => return Ok(Some(Group::FirstFrame)),
            2 => return Ok(Some(Group::Intermediate)),
            3 => return Ok(Some(Group::FinalFrame)),
            4 => return Ok(Some(Group::ImpactFrame)),
            _ => continue,
        }
    }
}

/// Read a line, returning `None` on interrupt or end-of-input.
fn prompt_line(editor: &mut DefaultEditor, message: &str) -> Result<Option<String>> {
    match editor.readline(message) {
        Ok(line) => {
            let _ = editor.add_history_entry(line.as_str());
            Ok(Some(line))
        }
        Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

fn prompt_usize(editor: &mut DefaultEditor, message: &str) -> Result<Option<usize>> {
    prompt_parsed(editor, message)
}

fn prompt_u32(editor: &mut DefaultEditor, message: &str) -> Result<Option<u32>> {
    prompt_parsed(editor, message)
}

fn prompt_i8(editor: &mut DefaultEditor, message: &str) -> Result<Option<i8>> {
    prompt_parsed(editor, message)
}

fn prompt_f32(editor: &mut DefaultEditor, message: &str) -> Result<Option<f32>> {
    prompt_parsed(editor, message)
}

/// Re-prompt until the input parses.
fn prompt_parsed<T: std::str::FromStr>(
    editor: &mut DefaultEditor,
    message: &str,
) -> Result<Option<T>> {
    loop {
        let Some(line) = prompt_line(editor, message)? else {
            return Ok(None);
        };
        match line.trim().parse::<T>() {
            Ok(value) => return Ok(Some(value)),
            Err(_) => println!("Invalid input."),
        }
    }
}

fn prompt_yes_no(editor: &mut DefaultEditor, message: &str) -> Result<Option<bool>> {
    loop {
        let Some(line) = prompt_line(editor, &format!("{message} (y/n): "))? else {
            return Ok(None);
        };
        match line.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => return Ok(Some(true)),
            "n" | "no" => return Ok(Some(false)),
            _ => println!("Invalid input."),
        }
    }
}
