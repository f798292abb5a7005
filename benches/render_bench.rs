use criterion::{criterion_group, criterion_main, Criterion};

use art_prompt::rendering::paint::paint_root;
use art_prompt::rendering::raster::rasterize;
use art_prompt::rendering::PreviewRenderer;
use art_prompt::state::FormState;

// Run with:
//    cargo bench

fn bench_render(c: &mut Criterion) {
    let renderer = PreviewRenderer::default();
    let mut state = FormState::default();
    state.set_simple_page(true);

    c.bench_function("render_state", |b| {
        b.iter(|| renderer.render_state(&state))
    });

    let root = renderer.render_state(&state);
    c.bench_function("paint_root", |b| b.iter(|| paint_root(&root)));
    c.bench_function("rasterize_1x", |b| b.iter(|| rasterize(&root, 1.0).unwrap()));
}

fn bench_keystrokes(c: &mut Criterion) {
    let renderer = PreviewRenderer::default();
    c.bench_function("title_keystrokes", |b| {
        b.iter(|| {
            let mut state = FormState::default();
            let mut title = String::new();
            for ch in "LOOK AT ONE PAINTING\\nFOR TEN MINUTES".chars() {
                title.push(ch);
                state.set_title(title.clone());
                let _ = renderer.render_state(&state);
            }
        })
    });
}

criterion_group!(benches, bench_render, bench_keystrokes);
criterion_main!(benches);
