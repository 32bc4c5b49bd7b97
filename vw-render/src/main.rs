mod text_box;

use anyhow::{anyhow, bail, Context};
use clap::{Args, Parser, Subcommand};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use text_box::TextBox;
use vw_graphics::{
    CharRenderProps, DrawingSurface, FixedMetrics, FontConfig, Graphics, RasterSurface,
    RecordingSurface, ResolvedFontConfig, Rgb, VwGraphics,
};
use vw_view::{
    print_pages, ActiveSelectionRegistry, CancelFlag, DrawOutcome, HeadlessHost, HostWindow,
    LayoutOutcome, PageSetup, PageSink, PrintOutcome, RenderingContext, RootSite, ScrollMode, SharedHost,
    SharedLayoutBox, ViewConfig, ViewError, ViewKind, ViewResult,
};

/// vw-render: Lay out plain text documents, scroll them and render them to PNG
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[clap(short, long, global = true)]
    verbose: bool,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render one viewport of a text document
    Render(RenderArgs),

    /// Print a text document as a sequence of page images
    Print(PrintArgs),
}

#[derive(Debug, Args)]
struct FontArgs {
    /// Font face name
    #[clap(long, default_value = "sans-serif")]
    font: String,

    /// Font size in points
    #[clap(long, default_value_t = 12.0)]
    size: f32,

    /// Additional directory to scan for fonts (may be repeated)
    #[clap(long)]
    font_dir: Vec<PathBuf>,

    /// Measure with a fixed-pitch model font instead of real fonts (display lists only)
    #[clap(long)]
    fixed_metrics: bool,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Path to input text file
    #[clap(short, long)]
    input: String,

    /// Path to output PNG file to be created
    #[clap(short, long)]
    output: Option<String>,

    /// Path to output display list (JSON) to be created
    #[clap(long)]
    display_list: Option<String>,

    /// Viewport width in pixels
    #[clap(long, default_value_t = 640)]
    width: u32,

    /// Viewport height in pixels
    #[clap(long, default_value_t = 480)]
    height: u32,

    /// Pixels per inch
    #[clap(long, default_value_t = 96)]
    dpi: u32,

    /// Select the first occurrence of this text and scroll it into view
    #[clap(long)]
    find: Option<String>,

    /// Place the found text near the top of the viewport
    #[clap(long)]
    near_top: bool,

    /// Path to a JSON view configuration
    #[clap(long)]
    config: Option<String>,

    #[clap(flatten)]
    fonts: FontArgs,
}

#[derive(Debug, Args)]
struct PrintArgs {
    /// Path to input text file
    #[clap(short, long)]
    input: String,

    /// Directory to write page files into
    #[clap(short = 'd', long)]
    output_dir: String,

    /// Page width in pixels (default: US letter)
    #[clap(long)]
    page_width: Option<i32>,

    /// Page height in pixels (default: US letter)
    #[clap(long)]
    page_height: Option<i32>,

    /// Page margin in pixels (default: half an inch)
    #[clap(long)]
    margin: Option<i32>,

    /// Pixels per inch
    #[clap(long, default_value_t = 96)]
    dpi: u32,

    /// Stop printing after this many pages
    #[clap(long)]
    max_pages: Option<usize>,

    #[clap(flatten)]
    fonts: FontArgs,
}

/// How text is measured and drawn.
enum Fonts {
    Fixed,
    Real(ResolvedFontConfig),
}

impl Fonts {
    fn load(args: &FontArgs) -> Self {
        if args.fixed_metrics {
            return Fonts::Fixed;
        }
        let config = FontConfig {
            font_dirs: args.font_dir.clone(),
            ..FontConfig::default()
        };
        let resolved = config.resolve();
        if resolved.is_empty() {
            log::warn!("no font faces found; text will not be drawn");
        } else {
            log::debug!("{} font faces available", resolved.face_count());
        }
        Fonts::Real(resolved)
    }

    fn resolved(&self) -> anyhow::Result<&ResolvedFontConfig> {
        match self {
            Fonts::Real(resolved) => Ok(resolved),
            Fonts::Fixed => bail!("--fixed-metrics cannot rasterize; write a display list instead"),
        }
    }

    /// A graphics engine for layout and measurement at `dpi`.
    fn measuring(&self, dpi: u32) -> anyhow::Result<Box<dyn Graphics>> {
        let gr: Box<dyn Graphics> = match self {
            Fonts::Fixed => Box::new(self.recorder(dpi)?),
            Fonts::Real(resolved) => Box::new(VwGraphics::with_surface(RasterSurface::new(1, 1, dpi, resolved)?)),
        };
        Ok(gr)
    }

    fn raster(&self, width: u32, height: u32, dpi: u32) -> anyhow::Result<VwGraphics<RasterSurface>> {
        let mut surface = RasterSurface::new(width, height, dpi, self.resolved()?)?;
        surface.clear(Rgb::WHITE);
        Ok(VwGraphics::with_surface(surface))
    }

    /// A display-list target. Without the fixed model it measures with a
    /// raster surface.
    fn recorder(&self, dpi: u32) -> anyhow::Result<VwGraphics<RecordingSurface>> {
        match self {
            Fonts::Fixed => Ok(VwGraphics::with_surface(RecordingSurface::with_metrics(
                dpi,
                FixedMetrics::default(),
            ))),
            Fonts::Real(resolved) => {
                let measure: Box<dyn DrawingSurface> = Box::new(RasterSurface::new(1, 1, dpi, resolved)?);
                let mut gr = VwGraphics::with_surface(RecordingSurface::new(dpi));
                gr.set_measure_surface(Some(measure))?;
                Ok(gr)
            }
        }
    }
}

fn char_props(args: &FontArgs) -> anyhow::Result<CharRenderProps> {
    if args.size.is_nan() || args.size <= 0.0 {
        bail!("Invalid font size: {}", args.size);
    }
    Ok(CharRenderProps {
        face_name: args.font.clone(),
        size_mp: (args.size * 1000.0).round() as i32,
        ..CharRenderProps::default()
    })
}

fn read_text(path: &str) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read input file: {}", path))
}

fn load_view_config(path: Option<&str>) -> anyhow::Result<ViewConfig> {
    let Some(path) = path else {
        return Ok(ViewConfig::default());
    };
    let json = fs::read_to_string(path).with_context(|| format!("Failed to read config file: {}", path))?;
    ViewConfig::from_json(&json).with_context(|| format!("Failed to load config file: {}", path))
}

fn write_file(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> anyhow::Result<()> {
    let path = path.as_ref();
    fs::write(path, data).with_context(|| format!("Failed to write output to {}", path.display()))
}

/// Draw the whole viewport of `site` onto `target`, repainting once if the
/// content asks for it.
fn draw_viewport(site: &mut RootSite, host: &RefCell<HeadlessHost>, target: &mut dyn Graphics) -> anyhow::Result<()> {
    let paint = host.borrow().client_rect();
    for _ in 0..2 {
        match site.draw(target, paint) {
            DrawOutcome::Drawn => return Ok(()),
            DrawOutcome::Invalidated => continue,
            DrawOutcome::NotReady => bail!("The viewport is too narrow to lay out the document"),
            DrawOutcome::Abandoned => {
                let host = host.borrow();
                let message = host.messages().last().cloned().unwrap_or_default();
                bail!("Drawing failed: {}", message);
            }
        }
    }
    bail!("The document kept invalidating the view while drawing")
}

fn render(args: RenderArgs) -> anyhow::Result<()> {
    if args.output.is_none() && args.display_list.is_none() {
        bail!("Nothing to write: pass --output and/or --display-list");
    }
    let text = read_text(&args.input)?;
    let config = load_view_config(args.config.as_deref())?;
    let props = char_props(&args.fonts)?;
    let fonts = Fonts::load(&args.fonts);
    if args.output.is_some() {
        fonts.resolved()?;
    }

    let text_box = Rc::new(RefCell::new(TextBox::new(&text, props)));
    let root: SharedLayoutBox = text_box.clone();
    let host = HeadlessHost::shared(args.width as i32, args.height as i32);
    let shared_host: SharedHost = host.clone();
    let context = RenderingContext::new(config.error_history);
    let mut site = RootSite::new(
        root,
        shared_host,
        fonts.measuring(args.dpi)?,
        ViewKind::default(),
        config,
        context,
    );
    if site.layout()? == LayoutOutcome::NotReady {
        bail!("The viewport is too narrow to lay out the document");
    }
    log::debug!(
        "{} paragraphs laid out to width {:?}",
        text_box.borrow().paragraph_count(),
        site.layout_width()
    );

    if let Some(term) = &args.find {
        let selection = text_box
            .borrow()
            .find(term)
            .ok_or_else(|| anyhow!("Text not found in {}: {}", args.input, term))?;
        site.set_selection(selection)?;
        let mut registry = ActiveSelectionRegistry::new();
        site.gain_focus(&mut registry);
        let mode = if args.near_top { ScrollMode::NearTop } else { ScrollMode::Default };
        site.scroll_selection_into_view(Some(&selection), mode)?;
        log::info!("scrolled to {:?}", site.scroll_position());
    }

    if let Some(path) = &args.output {
        let mut target = fonts.raster(args.width, args.height, args.dpi)?;
        draw_viewport(&mut site, &host, &mut target)?;
        let surface = target
            .release_device()
            .ok_or_else(|| anyhow!("Render target was released while drawing"))?;
        write_file(path, surface.to_png(None)?)?;
    }
    if let Some(path) = &args.display_list {
        let mut target = fonts.recorder(args.dpi)?;
        draw_viewport(&mut site, &host, &mut target)?;
        let surface = target
            .release_device()
            .ok_or_else(|| anyhow!("Render target was released while drawing"))?;
        write_file(path, surface.to_json()?)?;
    }
    log::debug!(
        "{} of {} paragraphs wrapped",
        text_box.borrow().materialized_count(),
        text_box.borrow().paragraph_count()
    );
    Ok(())
}

/// Writes each printed page to `<dir>/page-NNN.<ext>`.
struct PageFiles<'a> {
    dir: PathBuf,
    fonts: &'a Fonts,
    setup: PageSetup,
    max_pages: Option<usize>,
    cancel: CancelFlag,
}

impl PageFiles<'_> {
    fn path(&self, index: usize, extension: &str) -> PathBuf {
        self.dir.join(format!("page-{:03}.{}", index + 1, extension))
    }

    fn write(&self, path: PathBuf, data: impl AsRef<[u8]>) -> ViewResult<()> {
        fs::write(&path, data).map_err(|err| ViewError::Layout(format!("cannot write {}: {}", path.display(), err)))
    }

    fn finished(&self, index: usize) {
        if self.max_pages == Some(index + 1) {
            self.cancel.cancel();
        }
    }
}

fn page_error(err: anyhow::Error) -> ViewError {
    ViewError::Layout(format!("{:#}", err))
}

struct PngPages<'a>(PageFiles<'a>);

impl PageSink for PngPages<'_> {
    type Page = VwGraphics<RasterSurface>;

    fn begin_page(&mut self, _index: usize) -> ViewResult<Self::Page> {
        let setup = self.0.setup;
        self.0
            .fonts
            .raster(setup.width as u32, setup.height as u32, setup.dpi)
            .map_err(page_error)
    }

    fn end_page(&mut self, index: usize, mut page: Self::Page) -> ViewResult<()> {
        let surface = page
            .release_device()
            .ok_or_else(|| ViewError::Layout("page released before it was written".to_string()))?;
        self.0.write(self.0.path(index, "png"), surface.to_png(None)?)?;
        self.0.finished(index);
        Ok(())
    }
}

struct DisplayListPages<'a>(PageFiles<'a>);

impl PageSink for DisplayListPages<'_> {
    type Page = VwGraphics<RecordingSurface>;

    fn begin_page(&mut self, _index: usize) -> ViewResult<Self::Page> {
        self.0.fonts.recorder(self.0.setup.dpi).map_err(page_error)
    }

    fn end_page(&mut self, index: usize, mut page: Self::Page) -> ViewResult<()> {
        let surface = page
            .release_device()
            .ok_or_else(|| ViewError::Layout("page released before it was written".to_string()))?;
        self.0.write(self.0.path(index, "json"), surface.to_json()?)?;
        self.0.finished(index);
        Ok(())
    }
}

fn print(args: PrintArgs) -> anyhow::Result<()> {
    let text = read_text(&args.input)?;
    let props = char_props(&args.fonts)?;
    let fonts = Fonts::load(&args.fonts);

    let letter = PageSetup::letter(args.dpi);
    let setup = PageSetup {
        width: args.page_width.unwrap_or(letter.width),
        height: args.page_height.unwrap_or(letter.height),
        margin: args.margin.unwrap_or(letter.margin),
        dpi: args.dpi,
    };
    if setup.width <= 0 || setup.height <= 0 {
        bail!("Invalid page size: {}x{}", setup.width, setup.height);
    }
    if args.max_pages == Some(0) {
        bail!("--max-pages must be at least 1");
    }
    fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("Failed to create output directory: {}", args.output_dir))?;

    let root: SharedLayoutBox = Rc::new(RefCell::new(TextBox::new(&text, props)));
    let mut measure = fonts.measuring(args.dpi)?;
    let cancel = CancelFlag::new();
    let files = PageFiles {
        dir: PathBuf::from(&args.output_dir),
        fonts: &fonts,
        setup,
        max_pages: args.max_pages,
        cancel: cancel.clone(),
    };
    let outcome = match fonts {
        Fonts::Fixed => print_pages(&root, &mut *measure, &setup, &cancel, &mut DisplayListPages(files))?,
        Fonts::Real(_) => print_pages(&root, &mut *measure, &setup, &cancel, &mut PngPages(files))?,
    };
    match outcome {
        PrintOutcome::Completed { pages } => println!("Printed {} pages to {}", pages, args.output_dir),
        PrintOutcome::Cancelled { pages_printed } => {
            println!("Stopped after {} pages in {}", pages_printed, args.output_dir)
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match cli.command {
        Commands::Render(args) => render(args),
        Commands::Print(args) => print(args),
    }
}
