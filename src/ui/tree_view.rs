// include-walker - ui/tree_view.rs
//
// Plain-text rendering of a finished forest and its cycle report.
// Reads the model only; all output goes through the supplied writer.

use crate::core::model::{DependencyForest, Header, Module, Project};
use crate::core::report::CycleReport;
use crate::ui::theme;
use crate::util::constants::TREE_INDENT_WIDTH;
use std::io::{self, Write};

/// Presentation switches. Neither affects the forest itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Expand only nodes on a cycle or match path; collapse the rest.
    pub auto_expand: bool,
    /// Emit ANSI colour sequences.
    pub color: bool,
}

/// Render every project, module and header as an indented tree.
pub fn render_forest<W: Write>(
    forest: &DependencyForest,
    options: &RenderOptions,
    out: &mut W,
) -> io::Result<()> {
    let mut renderer = Renderer { out, options };
    for project in forest.projects().values() {
        renderer.project(project)?;
    }
    Ok(())
}

/// Write one ` * cycle detected` line per cycle node.
pub fn render_cycle_report<W: Write>(
    reports: &[CycleReport],
    options: &RenderOptions,
    out: &mut W,
) -> io::Result<()> {
    for report in reports {
        let chain = report.chain.join(" -> ");
        if options.color {
            writeln!(
                out,
                " * {}cycle detected{}: {}/{}: {}",
                theme::CYCLE,
                theme::RESET,
                report.project,
                report.module,
                chain
            )?;
        } else {
            writeln!(
                out,
                " * cycle detected: {}/{}: {}",
                report.project, report.module, chain
            )?;
        }
    }
    Ok(())
}

struct Renderer<'w, W: Write> {
    out: &'w mut W,
    options: &'w RenderOptions,
}

impl<W: Write> Renderer<'_, W> {
    fn expanded(&self, has_cycle: bool, has_match: bool) -> bool {
        !self.options.auto_expand || has_cycle || has_match
    }

    fn project(&mut self, project: &Project) -> io::Result<()> {
        self.indent(0)?;
        self.painted(project.name(), theme::container_colour(project.has_cycle()))?;
        self.container_marker(project.has_cycle())?;

        if !self.expanded(project.has_cycle(), project.has_match()) {
            self.collapsed(project.modules().len())?;
            return writeln!(self.out);
        }
        writeln!(self.out)?;
        for module in project.modules().values() {
            self.module(module)?;
        }
        Ok(())
    }

    fn module(&mut self, module: &Module) -> io::Result<()> {
        self.indent(1)?;
        self.painted(module.name(), theme::container_colour(module.has_cycle()))?;
        self.container_marker(module.has_cycle())?;

        if !self.expanded(module.has_cycle(), module.has_match()) {
            let hidden: usize = module
                .headers()
                .iter()
                .map(|h| 1 + h.descendant_count())
                .sum();
            self.collapsed(hidden)?;
            return writeln!(self.out);
        }
        writeln!(self.out)?;
        for header in module.headers() {
            self.header(header, 2)?;
        }
        Ok(())
    }

    fn header(&mut self, header: &Header, level: usize) -> io::Result<()> {
        self.indent(level)?;
        self.header_name(header)?;
        if header.is_cycle() {
            self.marker("[cycle]")?;
        } else if header.has_cycle() {
            self.marker("[contains cycle]")?;
        }
        if header.is_matched() {
            self.marker("[match]")?;
        }

        if header.is_leaf() {
            return writeln!(self.out);
        }
        if !self.expanded(header.has_cycle(), header.has_match()) {
            self.collapsed(header.descendant_count())?;
            return writeln!(self.out);
        }
        writeln!(self.out)?;
        for child in header.children() {
            self.header(child, level + 1)?;
        }
        Ok(())
    }

    fn header_name(&mut self, header: &Header) -> io::Result<()> {
        let name = header.display_name();
        let colour = theme::header_colour(header.traits());
        let span = header.display_match_span().filter(|_| self.options.color);
        let Some(span) = span else {
            return self.painted(name, colour);
        };

        self.painted(&name[..span.start], colour)?;
        write!(self.out, "{}", theme::MATCH)?;
        if let Some(code) = colour {
            write!(self.out, "{code}")?;
        }
        write!(self.out, "{}{}", &name[span.start..span.end], theme::RESET)?;
        self.painted(&name[span.end..], colour)
    }

    fn painted(&mut self, text: &str, colour: Option<&str>) -> io::Result<()> {
        match colour {
            Some(code) if self.options.color && !text.is_empty() => {
                write!(self.out, "{code}{text}{}", theme::RESET)
            }
            _ => write!(self.out, "{text}"),
        }
    }

    fn container_marker(&mut self, has_cycle: bool) -> io::Result<()> {
        if has_cycle {
            self.marker("[contains cycle]")?;
        }
        Ok(())
    }

    fn marker(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, " ")?;
        self.painted(text, Some(theme::DIM))
    }

    fn collapsed(&mut self, hidden: usize) -> io::Result<()> {
        write!(self.out, " ")?;
        self.painted(&format!("(+{hidden})"), Some(theme::DIM))
    }

    fn indent(&mut self, level: usize) -> io::Result<()> {
        write!(self.out, "{:width$}", "", width = level * TREE_INDENT_WIDTH)
    }
}
