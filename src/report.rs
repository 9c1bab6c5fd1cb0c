//! Report assembly and rendering.
//!
//! A [`Report`] is the serializable summary of one scan: per-module category
//! counts, the per-line kind view, and any soft-failure notices. It renders
//! either as pretty terminal output or as JSON for downstream tooling.

use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;

use crate::diagnostics::Diagnostic;
use crate::entity::EntityKind;
use crate::walk::ModuleAnalysis;

/// Category kinds in report order; keyword arguments live inside calls and
/// have no category of their own.
const CATEGORY_KINDS: &[EntityKind] = &[
    EntityKind::Variable,
    EntityKind::StarredVariable,
    EntityKind::Number,
    EntityKind::String,
    EntityKind::Tuple,
    EntityKind::List,
    EntityKind::Set,
    EntityKind::Call,
    EntityKind::IfExpression,
    EntityKind::Assignment,
];

#[derive(Debug, Serialize)]
pub struct Report {
    pub version: &'static str,
    pub modules: Vec<ModuleReport>,
}

#[derive(Debug, Serialize)]
pub struct ModuleReport {
    pub path: String,
    /// Registered entities across all categories.
    pub entities: usize,
    /// Non-zero category counts, keyed by kind tag.
    pub counts: BTreeMap<&'static str, usize>,
    /// Kind tags per source line, registration order preserved.
    pub lines: BTreeMap<usize, Vec<&'static str>>,
    pub notices: Vec<Diagnostic>,
}

impl Report {
    pub fn new(analyses: &[ModuleAnalysis]) -> Self {
        let modules = analyses
            .iter()
            .map(|analysis| {
                let mut counts = BTreeMap::new();
                for kind in CATEGORY_KINDS {
                    let count = analysis.stats.category(*kind).len();
                    if count > 0 {
                        counts.insert(kind.as_str(), count);
                    }
                }
                ModuleReport {
                    path: analysis.stats.path.clone(),
                    entities: analysis.stats.registered_count(),
                    counts,
                    lines: analysis.stats.line_kinds.clone(),
                    notices: analysis.diagnostics.notices().to_vec(),
                }
            })
            .collect();
        Self {
            version: env!("CARGO_PKG_VERSION"),
            modules,
        }
    }

    pub fn total_entities(&self) -> usize {
        self.modules.iter().map(|m| m.entities).sum()
    }

    pub fn total_notices(&self) -> usize {
        self.modules.iter().map(|m| m.notices.len()).sum()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Render the human-readable form.
    pub fn write_pretty(&self, out: &mut impl Write) -> Result<()> {
        for module in &self.modules {
            writeln!(
                out,
                "{} {}",
                module.path.bold(),
                format!("({} entities)", module.entities).dimmed()
            )?;
            if !module.counts.is_empty() {
                let counts = module
                    .counts
                    .iter()
                    .map(|(kind, count)| format!("{kind}: {count}"))
                    .collect::<Vec<_>>()
                    .join("  ");
                writeln!(out, "  {counts}")?;
            }
            for (line, kinds) in &module.lines {
                writeln!(
                    out,
                    "  {} {}",
                    format!("line {line}:").cyan(),
                    kinds.join(", ")
                )?;
            }
            for notice in &module.notices {
                writeln!(out, "  {}", notice.to_string().yellow())?;
            }
            writeln!(out)?;
        }
        writeln!(
            out,
            "{} file(s), {} entities, {} notice(s)",
            self.modules.len(),
            self.total_entities(),
            self.total_notices()
        )?;
        Ok(())
    }
}
