use criterion::{Criterion, criterion_group, criterion_main};
use runbook_studio_engine::editing::{EditorOptions, RunbookEditor};
mod common;

fn bench_edits_with_breakpoints(c: &mut Criterion) {
    let mut group = c.benchmark_group("tracking");
    group.sample_size(20);

    let content = common::generate_lines(2_000);
    let options = EditorOptions {
        code_analysis: false,
    };

    group.bench_function("insert_line_above_500_breakpoints", |b| {
        let mut editor = RunbookEditor::new(&content, options);
        for line in (1..=2_000).step_by(4) {
            editor.toggle_breakpoint(line);
        }
        b.iter(|| {
            editor.insert(0, "\n");
            editor.delete(0..1);
            std::hint::black_box(editor.bookmarks().len());
        });
    });

    group.bench_function("reparse", |b| {
        let mut editor =
            RunbookEditor::new(&common::generate_runbook(50), EditorOptions::default());
        b.iter(|| {
            editor.reparse();
            std::hint::black_box(editor.bookmarks().parse_errors().count());
        });
    });

    group.finish();
}

criterion_group!(benches, bench_edits_with_breakpoints);
criterion_main!(benches);
