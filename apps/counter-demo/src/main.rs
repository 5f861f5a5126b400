use fiber_core::{
    create_element, use_state, Attributes, Component, Element, FiberError, Listener, MemoryHost,
    Props,
};
use fiber_runtime_std::StdRuntime;

const DEFAULT_CLICKS: usize = 3;

fn app(_props: &Props) -> Result<Element, FiberError> {
    let (count, set_count) = use_state(0i64)?;
    let handle_click = Listener::new(move || {
        if let Err(err) = set_count.set(count + 1) {
            log::error!("click ignored: {err}");
        }
    });
    let even = count % 2 == 0;
    let parity = if even { "Even" } else { "Odd" };

    Ok(create_element(
        "div",
        Attributes::new(),
        vec![
            create_element(
                "h1",
                Attributes::new().with("onClick", handle_click),
                vec!["Hello, ".into(), count.into()],
            )
            .into(),
            create_element("h2", Attributes::new(), vec![parity.into()]).into(),
            create_element(
                "ul",
                Attributes::new(),
                vec![
                    create_element("li", Attributes::new(), vec![1i32.into()]).into(),
                    create_element("li", Attributes::new(), vec![2i32.into()]).into(),
                    even.then(|| create_element("li", Attributes::new(), vec![3i32.into()]))
                        .into(),
                ],
            )
            .into(),
        ],
    ))
}

fn run(clicks: usize) -> Result<(), FiberError> {
    let runtime = StdRuntime::new();
    let mut host = MemoryHost::new();
    let container = host.create_container("root");
    let mut root = runtime.create_root(host, container);

    root.render(create_element(
        Component::new("App", app),
        Attributes::new().with("count", 1i64),
        vec![],
    ));
    let grants = runtime.run_until_idle(&mut root)?;
    let ops = root.host_mut().take_ops().len();
    println!("initial render ({grants} idle grants, {ops} host ops):");
    print!("{}", root.host().dump_tree(container));

    for click in 1..=clicks {
        let Some(&heading) = root.host().find_all(container, "h1").first() else {
            log::error!("no heading to click");
            break;
        };
        root.host().dispatch(heading, "click")?;
        let grants = runtime.run_until_idle(&mut root)?;
        let ops = root.host_mut().take_ops().len();
        println!("after click {click} ({grants} idle grants, {ops} host ops):");
        print!("{}", root.host().dump_tree(container));
    }
    Ok(())
}

fn main() {
    env_logger::init();

    let clicks = match std::env::args().nth(1) {
        Some(arg) => match arg.parse() {
            Ok(clicks) => clicks,
            Err(err) => {
                log::error!("invalid click count {arg:?}: {err}");
                std::process::exit(2);
            }
        },
        None => DEFAULT_CLICKS,
    };

    println!("=== Fiber Counter Example ===");
    println!("Simulating {clicks} clicks on the heading");

    if let Err(err) = run(clicks) {
        log::error!("counter demo failed: {err}");
        std::process::exit(1);
    }
}
