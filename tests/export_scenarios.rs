//! End-to-end scenarios: build a page live, then export it.

use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;
use spark_page::{
    AppConfig, Application, ArtifactSink, BehaviorError, Children, DirectorySink, NodeConfig, PageError,
    ROOT_RESET, style_bag,
};

fn counter_app() -> (Application, spark_page::NodeRef, spark_page::StateCell) {
    let mut app = Application::new(AppConfig::default().with_title("Demo"));
    let count = app.add_state("count", 0).unwrap();

    let increment = app.behavior_with("(event) => {\n    count.set(count.get() + 1);\n}", {
        let count = count.clone();
        move |_| {
            let next = count.get().as_i64().unwrap_or(0) + 1;
            count.set(next);
            Ok(())
        }
    });
    let show = app.behavior("(val) => { display.textContent = val; }");
    count.add_listener(&show);

    let display = app.create("p", NodeConfig::new(), "0", Some("display")).unwrap();
    let button = app
        .create("button", NodeConfig::new().on("click", &increment), "+", Some("plus"))
        .unwrap();
    app.append_child(display);
    app.append_child(button);
    (app, button, count)
}

#[test]
fn test_counter_export() {
    let (app, _, _) = counter_app();
    let html = app.export().unwrap();

    let expected = [
        "<!DOCTYPE html><html><head>",
        r#"<meta charset="UTF-8">"#,
        r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#,
        "<title>Demo</title>",
        r#"<style id="pageAnimations"></style>"#,
        r#"<style id="pageStyles">"#,
        ROOT_RESET,
        ".pageRoot{display:flex;width:100vw;height:100vh;}</style></head>",
        r#"<body><div class="pageRoot">"#,
        r#"<p id="display">0</p>"#,
        r#"<button id="plus" onclick="behavior0(event);">+</button>"#,
        "</div><script>",
        "const behavior0=(event)=>{count.set(count.get() + 1);};",
        "const behavior1=(val)=>{display.textContent = val;};",
        r#"const display=document.getElementById("display");"#,
        r#"const plus=document.getElementById("plus");"#,
        "const count={value:0,initial:0,get:()=>count.value,getInitial:()=>count.initial,",
        "set:(val)=>{count.value=val;behavior1(count.value);}};",
        "</script></body></html>",
    ]
    .concat();
    assert_eq!(html, expected);
}

#[test]
fn test_counter_runs_live_and_exports_initial_value() {
    let (app, button, count) = counter_app();

    let report = app.dispatch(button, "click", &Value::Null);
    app.dispatch(button, "click", &Value::Null);

    assert!(report.is_clean());
    assert_eq!(count.get(), Value::from(2));
    assert_eq!(count.initial(), &Value::from(0));
    assert!(app.export().unwrap().contains("const count={value:0,initial:0,"));
}

#[test]
fn test_shared_behavior_declared_once() {
    let mut app = Application::default();
    let log = app.behavior("(v) => { console.log(v); }");
    let a = app.add_state("a", 1).unwrap();
    let b = app.add_state("b", "x").unwrap();
    a.add_listener(&log);
    b.add_listener(&log);

    let node = app.create("div", NodeConfig::new().on("click", &log), "click", None).unwrap();
    app.append_child(node);

    let html = app.export().unwrap();
    assert_eq!(html.matches("const behavior0=").count(), 1);
    assert_eq!(html.matches("behavior0(").count(), 3);
    assert!(!html.contains("behavior1"));
    assert!(html.contains(r#"<div onclick="behavior0(event);">click</div>"#));
    assert!(html.contains("set:(val)=>{a.value=val;behavior0(a.value);}"));
    assert!(html.contains(r#"const b={value:"x",initial:"x","#));
}

#[test]
fn test_pseudo_class_rules() {
    let mut app = Application::default();
    app.add_style(".box", style_bag! { "color" => "red", "hover" => [("color", "blue")] });
    app.publish_style(".box");

    let node = app.create("div", NodeConfig::new().style(".box"), "hi", None).unwrap();
    app.append_child(node);

    let html = app.export().unwrap();
    assert!(html.contains(".box{color:red;}.box:hover{color:blue;}</style>"));
    assert!(html.contains(r#"<div class="box">hi</div>"#));
}

#[test]
fn test_style_edits_after_publish_reach_export() {
    let mut app = Application::default();
    app.add_style(".fade", style_bag! { "transition" => "opacity 1s" });
    app.publish_style(".fade");
    app.add_to_style(".fade", &style_bag! { "transition" => "color 2s" }).unwrap();

    assert!(app.export().unwrap().contains(".fade{transition:opacity 1s,color 2s;}"));

    app.set_to_style(".fade", &style_bag! { "transition" => "none" }).unwrap();
    assert!(app.export().unwrap().contains(".fade{transition:none;}"));

    let err = app.add_to_style(".fade", &style_bag! { "transition" => [("x", "y")] });
    assert!(matches!(err, Err(PageError::StyleShapeMismatch { .. })));
}

#[test]
fn test_duplicate_id_keeps_tree() {
    let mut app = Application::default();
    let first = app.create("div", NodeConfig::new(), "one", Some("main")).unwrap();
    app.append_child(first);
    let before = app.export().unwrap();

    assert!(matches!(
        app.create("span", NodeConfig::new(), "two", Some("main")),
        Err(PageError::DuplicateId { .. })
    ));
    assert_eq!(app.export().unwrap(), before);
}

#[test]
fn test_listener_failure_is_isolated() {
    let mut app = Application::default();
    let cell = app.add_state("value", 0).unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));

    let failing = app.behavior_with("(v) => { explode(v); }", |_| Err(BehaviorError::new("exploded")));
    let recording = {
        let seen = seen.clone();
        app.behavior_with("(v) => { record(v); }", move |v| {
            seen.borrow_mut().push(v.clone());
            Ok(())
        })
    };
    cell.add_listener(&failing);
    cell.add_listener(&recording);

    let report = cell.set(5);
    assert_eq!(*seen.borrow(), vec![Value::from(5)]);
    assert_eq!(report.failures.len(), 1);
}

#[test]
fn test_onload_must_be_function() {
    let mut app = Application::default();
    let hook = app.behavior("init()");
    app.set_onload(&hook);
    assert!(matches!(app.export(), Err(PageError::InitializerNotFunction { .. })));

    let hook = app.behavior("function start() { init(); }");
    app.set_onload(&hook);
    assert!(app.export().unwrap().ends_with("window.onload=()=>{init();};</script></body></html>"));
}

#[test]
fn test_directory_sink_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let mut app = Application::new(AppConfig::default().with_title("Saved Page"));
    let node = app.create("h1", NodeConfig::new(), "Hello", None).unwrap();
    app.append_child(node);

    let mut sink = DirectorySink::new(dir.path());
    let name = app.export_to(&mut sink, None).unwrap();
    assert_eq!(name, "Saved Page.html");

    let written = std::fs::read_to_string(dir.path().join(&name)).unwrap();
    assert_eq!(written, app.export().unwrap());

    sink.deliver("copy.html", &written).unwrap();
    assert!(dir.path().join("copy.html").exists());
}

#[test]
fn test_nested_tree_and_text_children() {
    let mut app = Application::default();
    let item_a = app.create("li", NodeConfig::new(), "a", None).unwrap();
    let item_b = app.create("li", NodeConfig::new(), Children::Text("b & c".into()), None).unwrap();
    let list = app.create("ul", NodeConfig::new().attr("role", "list"), [item_a, item_b], None).unwrap();
    app.append_child(list);

    assert!(app
        .export()
        .unwrap()
        .contains(r#"<div class="pageRoot"><ul role="list"><li>a</li><li>b &amp; c</li></ul></div>"#));
}
