use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use fiber_core::{create_element, Attributes, Child, Element, MemoryHost, Root, UnitBudget};

fn table(rows: usize, tick: usize) -> Element {
    let rows: Vec<Child> = (0..rows)
        .map(|row| {
            create_element(
                "tr",
                Attributes::new().with("id", format!("row-{row}")),
                vec![
                    create_element("td", Attributes::new(), vec![row.into()]).into(),
                    create_element("td", Attributes::new(), vec![(row + tick).into()]).into(),
                ],
            )
            .into()
        })
        .collect();
    create_element("table", Attributes::new(), rows)
}

fn mounted(rows: usize) -> Root<MemoryHost> {
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let mut root = Root::new(host, container);
    root.render(table(rows, 0));
    root.flush().expect("initial render");
    root
}

fn initial_mount(c: &mut Criterion) {
    let mut group = c.benchmark_group("initial_mount");
    for rows in [10usize, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(rows), &rows, |b, &rows| {
            b.iter(|| black_box(mounted(rows)));
        });
    }
    group.finish();
}

fn rerender_unchanged(c: &mut Criterion) {
    let mut root = mounted(500);
    c.bench_function("rerender_unchanged", |b| {
        b.iter(|| {
            root.render(table(500, 0));
            black_box(root.flush().expect("render"));
        });
    });
}

fn rerender_changed_cells(c: &mut Criterion) {
    let mut root = mounted(500);
    let mut tick = 0;
    c.bench_function("rerender_changed_cells", |b| {
        b.iter(|| {
            tick += 1;
            root.render(table(500, tick));
            black_box(root.flush().expect("render"));
        });
    });
}

fn sliced_pass(c: &mut Criterion) {
    let mut root = mounted(500);
    c.bench_function("sliced_pass_64_units", |b| {
        b.iter(|| {
            root.render(table(500, 1));
            while !root
                .perform_work(&mut UnitBudget::new(64))
                .expect("slice")
                .is_committed()
            {}
        });
    });
}

criterion_group!(
    benches,
    initial_mount,
    rerender_unchanged,
    rerender_changed_cells,
    sliced_pass
);
criterion_main!(benches);
