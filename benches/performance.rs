use flatlist::paste::{self, PasteContext};
use flatlist::postprocess::{self, PostprocessOptions};
use flatlist::render::render_document;
use flatlist::theme::Theme;
use flatlist::{
    Block, Document, Editor, EditorConfig, ExportTarget, ListItem, Position, Selection, Slice,
    parse_html,
};
use std::time::{Duration, Instant};

/// Performance benchmarks for list maintenance on large documents.
///
/// Run with: cargo test --release --bench performance -- --nocapture
///
/// This measures:
/// - The postprocess pass (counters, staircase repair, placeholder cleanup)
/// - Folding flat items into nested HTML and parsing it back
/// - Paste normalization of long fragments
/// - Indent commands and rendering inside an editor
const SMALL_DOC_ITEMS: usize = 10;
const MEDIUM_DOC_ITEMS: usize = 100;
const LARGE_DOC_ITEMS: usize = 1000;
const HUGE_DOC_ITEMS: usize = 10000;

const ITERATIONS: usize = 100;

const SAMPLE_WORDS: [&str; 12] = [
    "Lorem",
    "ipsum",
    "dolor",
    "sit",
    "amet",
    "consectetur",
    "adipiscing",
    "elit",
    "sed",
    "do",
    "eiusmod",
    "tempor",
];

/// Indent pattern climbing to depth 4 and back, broken by a paragraph every
/// 25 blocks.
fn create_list_document(num_items: usize) -> Document {
    let mut blocks = Vec::with_capacity(num_items);
    for i in 0..num_items {
        let text = (0..6)
            .map(|w| SAMPLE_WORDS[(i + w) % SAMPLE_WORDS.len()])
            .collect::<Vec<_>>()
            .join(" ");
        if i % 25 == 24 {
            blocks.push(Block::paragraph(&text));
            continue;
        }
        let indent = [0, 1, 2, 3, 4, 2, 1][i % 7];
        let item = match i % 3 {
            0 => ListItem::ordered(),
            1 => ListItem::unordered(),
            _ => ListItem::task(i % 2 == 0),
        };
        blocks.push(item.with_indent(indent).with_text(&text).into());
    }
    Document::new().with_blocks(blocks)
}

/// Same shape with counters left at 1 and indents off the staircase.
fn create_broken_document(num_items: usize) -> Document {
    let mut doc = create_list_document(num_items);
    for (i, block) in doc.blocks.iter_mut().enumerate() {
        if let Some(item) = block.as_list_item_mut() {
            item.indent += i % 4;
        }
    }
    doc
}

struct BenchmarkResult {
    name: String,
    iterations: usize,
    total_duration: Duration,
    avg_duration: Duration,
    min_duration: Duration,
    max_duration: Duration,
}

impl BenchmarkResult {
    fn print(&self) {
        println!("\n{}", "=".repeat(70));
        println!("Benchmark: {}", self.name);
        println!("{}", "=".repeat(70));
        println!("Iterations:     {}", self.iterations);
        println!("Total time:     {:?}", self.total_duration);
        println!("Average:        {:?}", self.avg_duration);
        println!("Min:            {:?}", self.min_duration);
        println!("Max:            {:?}", self.max_duration);
        println!(
            "Ops/sec:        {:.2}",
            1_000_000.0 / self.avg_duration.as_micros().max(1) as f64
        );

        if self.avg_duration.as_millis() > 100 {
            println!("\n⚠️  WARNING: Average duration > 100ms (user-perceptible lag)");
        } else if self.avg_duration.as_millis() > 16 {
            println!("\n⚠️  WARNING: Average duration > 16ms (may drop frames)");
        }
    }
}

fn benchmark<F>(name: &str, iterations: usize, mut f: F) -> BenchmarkResult
where
    F: FnMut(),
{
    let mut durations = Vec::with_capacity(iterations);

    // Warmup
    for _ in 0..10 {
        f();
    }

    for _ in 0..iterations {
        let start = Instant::now();
        f();
        durations.push(start.elapsed());
    }

    let total_duration: Duration = durations.iter().sum();
    let avg_duration = total_duration / iterations as u32;
    let min_duration = *durations.iter().min().unwrap();
    let max_duration = *durations.iter().max().unwrap();

    BenchmarkResult {
        name: name.to_string(),
        iterations,
        total_duration,
        avg_duration,
        min_duration,
        max_duration,
    }
}

fn sizes() -> Vec<(&'static str, usize)> {
    vec![
        ("Small (10 items)", SMALL_DOC_ITEMS),
        ("Medium (100 items)", MEDIUM_DOC_ITEMS),
        ("Large (1000 items)", LARGE_DOC_ITEMS),
        ("Huge (10000 items)", HUGE_DOC_ITEMS),
    ]
}

fn iterations_for(name: &str) -> usize {
    if name.contains("Huge") { 10 } else { ITERATIONS }
}

#[test]
fn bench_postprocess_pass() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              POSTPROCESS PASS BENCHMARKS                       ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    for (name, size) in sizes() {
        let clean = create_list_document(size);
        let mut settled = clean.clone();
        postprocess::run(&mut settled, PostprocessOptions::default()).unwrap();
        let result = benchmark(&format!("plan (consistent) - {name}"), iterations_for(name), || {
            assert!(postprocess::plan(&settled, PostprocessOptions::default()).is_none());
        });
        result.print();

        let broken = create_broken_document(size);
        let result = benchmark(&format!("run (repairing) - {name}"), iterations_for(name), || {
            let mut doc = broken.clone();
            postprocess::run(&mut doc, PostprocessOptions::default()).unwrap();
        });
        result.print();
    }
}

#[test]
fn bench_html_fold_and_parse() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              HTML FOLD / PARSE BENCHMARKS                      ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    for (name, size) in sizes() {
        let mut doc = create_list_document(size);
        postprocess::run(&mut doc, PostprocessOptions::default()).unwrap();

        let result = benchmark(&format!("export (document) - {name}"), iterations_for(name), || {
            let _ = flatlist::html::blocks_to_html(&doc.blocks, ExportTarget::Document);
        });
        result.print();

        let html = flatlist::html::blocks_to_html(&doc.blocks, ExportTarget::Clipboard);
        let result = benchmark(&format!("parse (clipboard) - {name}"), iterations_for(name), || {
            let slice = parse_html(&html);
            assert!(!slice.is_empty());
        });
        result.print();
    }
}

#[test]
fn bench_paste_normalization() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              PASTE NORMALIZATION BENCHMARKS                    ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    for (name, size) in sizes() {
        let fragment = Slice::new(create_broken_document(size).blocks);
        let context = PasteContext {
            indent: 2,
            at_item_start: true,
        };
        let result = benchmark(&format!("normalize - {name}"), iterations_for(name), || {
            let mut slice = fragment.clone();
            paste::normalize(&mut slice, context);
        });
        result.print();
    }
}

#[test]
fn bench_indent_cycle() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              INDENT / DEDENT COMMAND BENCHMARKS                ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    for (name, size) in sizes() {
        let mut editor = Editor::new(create_list_document(size), EditorConfig::default());
        let middle = size / 2;
        editor.set_selection(Selection::cursor(Position::at_root(middle, 0)));
        let result = benchmark(&format!("indent + dedent - {name}"), iterations_for(name), || {
            editor.indent();
            editor.dedent(false);
        });
        result.print();
    }
}

#[test]
fn bench_rendering() {
    println!("\n\n╔════════════════════════════════════════════════════════════════╗");
    println!("║              RENDERING BENCHMARKS                              ║");
    println!("╚════════════════════════════════════════════════════════════════╝");

    let theme = Theme::default();
    for (name, size) in sizes() {
        let mut doc = create_list_document(size);
        postprocess::run(&mut doc, PostprocessOptions::default()).unwrap();
        let cursor = Position::at_root(size / 2, 3);
        let result = benchmark(&format!("render_document - {name}"), iterations_for(name), || {
            let _ = render_document(&doc, &cursor, 80, &theme);
        });
        result.print();
    }
}
