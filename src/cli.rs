use crate::config::{load_config, Unit};
use crate::dom::Element;
use crate::parser::parse_svg;
use crate::pipeline::{annotate, AnnotateRequest, Annotation, TRANSPARENT};
use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "svgdim", version, about = "Annotate SVG images with measured dimension overlays")]
pub struct Args {
    /// Input file (.svg) or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// What to emit
    #[arg(short = 'e', long = "emit", value_enum, default_value = "composite")]
    pub emit: EmitKind,

    /// Config JSON file (camelCase OverlayConfig fields)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,

    /// Requested width (free-form numeric text)
    #[arg(short = 'w', long = "width")]
    pub width: Option<String>,

    /// Requested height
    #[arg(short = 'H', long = "height")]
    pub height: Option<String>,

    /// Unit suffix for dimension labels
    #[arg(long = "unit", value_enum)]
    pub unit: Option<UnitArg>,

    /// Round label values to whole numbers
    #[arg(long = "round")]
    pub round: bool,

    /// Skip dimension and extension lines
    #[arg(long = "no-lines")]
    pub no_lines: bool,

    /// Skip dimension labels
    #[arg(long = "no-labels")]
    pub no_labels: bool,

    /// Report a transparent backdrop instead of scoring the palette
    #[arg(long = "transparent")]
    pub transparent: bool,

    /// Keep full-canvas background rectangles
    #[arg(long = "keep-background")]
    pub keep_background: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum EmitKind {
    /// Annotated document with overlay and backdrop composited in
    Composite,
    /// Sanitized/pruned document only
    Annotated,
    /// Overlay fragment only
    Overlay,
    /// Resolved backdrop color
    Background,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum UnitArg {
    Px,
    Mm,
}

impl From<UnitArg> for Unit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Px => Unit::Px,
            UnitArg::Mm => Unit::Mm,
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let mut config = load_config(args.config.as_deref())?;
    if let Some(unit) = args.unit {
        config.unit = unit.into();
    }
    if args.round {
        config.round_values = true;
    }
    if args.no_lines {
        config.show_lines = false;
    }
    if args.no_labels {
        config.show_labels = false;
    }
    if args.transparent {
        config.transparent_background = true;
    }

    let input = read_input(args.input.as_deref())?;
    let mut request = AnnotateRequest::new(&input);
    request.requested_width = args.width.as_deref();
    request.requested_height = args.height.as_deref();
    request.prune = !args.keep_background;
    request.config = config;
    let annotation = annotate(&request)?;

    let output = match args.emit {
        EmitKind::Composite => composite(&annotation)?,
        EmitKind::Annotated => annotation.document,
        EmitKind::Overlay => annotation.overlay,
        EmitKind::Background => annotation.background,
    };
    write_output(&output, args.output.as_deref())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return Ok(std::fs::read_to_string(path)?);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, content)?,
        None => print!("{}", content),
    }
    Ok(())
}

/// Build a standalone preview: the annotated document with the backdrop
/// painted behind it, the overlay fragment on top, and the viewBox expanded
/// so the overlay is visible.
fn composite(annotation: &Annotation) -> Result<String> {
    // Re-parse our own serialization; it is valid by construction.
    let mut doc = parse_svg(&annotation.document)?;
    let pad_near = annotation.margin * 1.8;
    let pad_far = annotation.margin * 0.5;
    let min_x = annotation.metrics.origin_x - pad_near;
    let min_y = annotation.metrics.origin_y - pad_near;
    let view_width = annotation.metrics.width + pad_near + pad_far;
    let view_height = annotation.metrics.height + pad_near + pad_far;

    doc.root.set_attr("width", &format!("{:.0}", view_width));
    doc.root.set_attr("height", &format!("{:.0}", view_height));
    doc.root.set_attr(
        "viewBox",
        &format!("{} {} {} {}", min_x, min_y, view_width, view_height),
    );

    if annotation.background != TRANSPARENT {
        let mut backdrop = Element::new("rect");
        backdrop.set_attr("x", &format!("{}", min_x));
        backdrop.set_attr("y", &format!("{}", min_y));
        backdrop.set_attr("width", &format!("{}", view_width));
        backdrop.set_attr("height", &format!("{}", view_height));
        backdrop.set_attr("fill", &annotation.background);
        doc.root
            .children
            .insert(0, crate::dom::Node::Element(backdrop));
    }

    Ok(inject_fragment(doc.to_svg_string(), &annotation.overlay))
}

fn inject_fragment(mut serialized: String, fragment: &str) -> String {
    if let Some(position) = serialized.rfind("</svg>") {
        serialized.insert_str(position, fragment);
        return serialized;
    }
    if serialized.ends_with("/>") {
        serialized.truncate(serialized.len() - 2);
        serialized.push('>');
        serialized.push_str(fragment);
        serialized.push_str("</svg>");
    }
    serialized
}
