//! `quarry tasks`: every generated task with whether it would run now.

use std::path::Path;

use anyhow::Result;
use owo_colors::{OwoColorize, Stream};
use serde::Serialize;

use quarry_lib::staleness;
use quarry_lib::task::Task;

use super::Session;
use crate::output::{OutputFormat, count, print_info, print_json, symbols};

#[derive(Serialize)]
struct TaskEntry<'a> {
  namespace: &'a str,
  needed: bool,
  #[serde(flatten)]
  task: &'a Task,
}

#[derive(Serialize)]
struct FileTargetEntry<'a> {
  path: &'a Path,
  task: &'a str,
}

pub fn cmd_tasks(session: &Session, format: OutputFormat, files: bool) -> Result<()> {
  if files {
    return list_file_targets(session, format);
  }

  let tasks = &session.workspace.tasks;
  let entries: Vec<TaskEntry> = tasks
    .tasks()
    .filter_map(|task| {
      let namespace = tasks.namespace(task.project)?;
      if session.namespace.as_deref().is_some_and(|ns| ns != namespace) {
        return None;
      }
      Some(TaskEntry {
        namespace,
        needed: staleness::needed(task),
        task,
      })
    })
    .collect();

  if format.is_json() {
    return print_json(&entries);
  }

  let width = entries.iter().map(|e| e.task.name.len()).max().unwrap_or(0);
  for entry in &entries {
    let symbol = if entry.needed {
      symbols::STALE.if_supports_color(Stream::Stdout, |s| s.yellow()).to_string()
    } else {
      symbols::SUCCESS.if_supports_color(Stream::Stdout, |s| s.green()).to_string()
    };
    println!(
      "{} {:width$}  {}",
      symbol,
      entry.task.name,
      entry.task.description.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      width = width
    );
  }

  let stale = entries.iter().filter(|e| e.needed).count();
  println!();
  print_info(&format!(
    "{}, {} out of date",
    count(entries.len(), "task"),
    stale
  ));
  Ok(())
}

fn list_file_targets(session: &Session, format: OutputFormat) -> Result<()> {
  let tasks = &session.workspace.tasks;
  let entries: Vec<FileTargetEntry> = tasks
    .file_targets()
    .filter(|(_, task)| match session.namespace.as_deref() {
      Some(ns) => task.split(':').next() == Some(ns),
      None => true,
    })
    .map(|(path, task)| FileTargetEntry { path, task })
    .collect();

  if format.is_json() {
    return print_json(&entries);
  }

  for entry in &entries {
    println!(
      "{} {} {}",
      entry.path.display(),
      symbols::ARROW.if_supports_color(Stream::Stdout, |s| s.dimmed()),
      entry.task
    );
  }
  Ok(())
}
