use postrender::rendering::{self, ComposedDocument};
use postrender::request::PostSpec;
use scraper::{Html, Selector};
use serde_json::{json, Value};

fn compose(body: Value) -> ComposedDocument {
    let spec = PostSpec::from_body(&serde_json::to_vec(&body).unwrap()).unwrap();
    rendering::compose(&spec)
}

fn base() -> Value {
    json!({
        "imageUrl": "https://x/a.jpg",
        "logoUrl": "https://x/logo.png",
        "text01": "BREAKING",
        "focusText": "NEWS",
        "text02": "TODAY"
    })
}

fn style_text(doc: &Html) -> String {
    let sel = Selector::parse("head > style").unwrap();
    doc.select(&sel).next().unwrap().text().collect()
}

/// Declarations of the first rule whose selector is exactly `selector`.
fn rule<'a>(css: &'a str, selector: &str) -> &'a str {
    let start = css.find(&format!("{} {{", selector)).unwrap();
    let end = start + css[start..].find('}').unwrap();
    &css[start..end]
}

#[test]
fn default_document_is_ltr_english_with_orange_accent() {
    let composed = compose(base());
    let doc = Html::parse_document(&composed.html);

    let html_sel = Selector::parse("html").unwrap();
    let root = doc.select(&html_sel).next().unwrap();
    assert_eq!(root.value().attr("lang"), Some("en"));
    assert_eq!(root.value().attr("dir"), Some("ltr"));

    let css = style_text(&doc);
    assert!(rule(&css, ".logo").contains("right: 20px;"));
    assert!(rule(&css, ".focus-text").contains("background-color: #FF4500;"));
    assert!(rule(&css, ".line").contains("background-color: #FF4500;"));
    assert!(rule(&css, ".line-2").contains("background-color: #ffffff;"));
    assert!(rule(&css, ".image").contains("filter: brightness(0.7);"));
    assert!(rule(&css, ".image").contains("background-image: url('https://x/a.jpg');"));
}

#[test]
fn rtl_document_moves_logo_left() {
    let mut body = base();
    body["direction"] = json!("rtl");
    body["language"] = json!("he");
    let composed = compose(body);
    let doc = Html::parse_document(&composed.html);

    let html_sel = Selector::parse("html").unwrap();
    let root = doc.select(&html_sel).next().unwrap();
    assert_eq!(root.value().attr("dir"), Some("rtl"));
    assert_eq!(root.value().attr("lang"), Some("he"));

    let css = style_text(&doc);
    let logo = rule(&css, ".logo");
    assert!(logo.contains("left: 20px;"));
    assert!(!logo.contains("right: 20px;"));
    assert!(rule(&css, ".text-overlay").contains("direction: rtl;"));
}

#[test]
fn uppercase_direction_keeps_logo_right() {
    let mut body = base();
    body["direction"] = json!("RTL");
    let composed = compose(body);
    let doc = Html::parse_document(&composed.html);

    let css = style_text(&doc);
    assert!(rule(&css, ".logo").contains("right: 20px;"));
    assert!(rule(&css, ".text-overlay").contains("direction: ltr;"));
}

#[test]
fn layers_are_stacked_back_to_front() {
    let composed = compose(base());
    let doc = Html::parse_document(&composed.html);

    let sel = Selector::parse(".container > div").unwrap();
    let classes: Vec<&str> = doc
        .select(&sel)
        .filter_map(|e| e.value().attr("class"))
        .collect();
    assert_eq!(
        classes,
        vec!["image", "overlay-top", "overlay-bottom", "logo", "text-overlay", "bottom-right-lines"]
    );

    let sel = Selector::parse(".text-overlay > div").unwrap();
    let row: Vec<(String, String)> = doc
        .select(&sel)
        .map(|e| {
            (
                e.value().attr("class").unwrap_or_default().to_string(),
                e.text().collect::<String>(),
            )
        })
        .collect();
    assert_eq!(
        row,
        vec![
            ("text".to_string(), "BREAKING".to_string()),
            ("focus-text".to_string(), "NEWS".to_string()),
            ("text".to_string(), "TODAY".to_string()),
        ]
    );
}

#[test]
fn injected_markup_stays_text() {
    let mut body = base();
    body["focusText"] = json!("<b onclick=\"x()\">NEWS</b>");
    body["imageUrl"] = json!("https://x/a.jpg'); } </style><script>alert(1)</script>");
    let composed = compose(body);
    let doc = Html::parse_document(&composed.html);

    assert_eq!(doc.select(&Selector::parse("script").unwrap()).count(), 0);
    assert_eq!(doc.select(&Selector::parse("b").unwrap()).count(), 0);
    assert_eq!(doc.select(&Selector::parse("style").unwrap()).count(), 1);

    let focus = doc.select(&Selector::parse(".focus-text").unwrap()).next().unwrap();
    assert_eq!(focus.text().collect::<String>(), "<b onclick=\"x()\">NEWS</b>");
}

const DEFAULT_STYLESHEET: &str = "\
body {
  margin: 0;
  padding: 0;
  font-family: Arial, sans-serif;
  position: relative;
}
.container {
  position: relative;
  width: 1080px;
  height: 1080px;
  overflow: hidden;
}
.image {
  width: 100%;
  height: 100%;
  background-image: url('https://x/a.jpg');
  background-size: cover;
  background-position: center;
  filter: brightness(0.7);
}
.overlay-top, .overlay-bottom {
  position: absolute;
  left: 0;
  right: 0;
  height: 100px;
  background: linear-gradient(to bottom, rgba(0, 0, 0, 0.5), transparent);
}
.overlay-bottom {
  bottom: 0;
  background: linear-gradient(to top, rgba(0, 0, 0, 0.5), transparent);
}
.overlay-top {
  top: 0;
}
.logo {
  position: absolute;
  top: 20px;
  right: 20px;
  width: 100px;
  height: 100px;
  background-image: url('https://x/logo.png');
  background-size: contain;
  background-repeat: no-repeat;
  background-position: center;
}
.text-overlay {
  position: absolute;
  bottom: 100px;
  left: 50%;
  transform: translateX(-50%);
  text-align: center;
  width: 90%;
  display: flex;
  flex-wrap: wrap;
  justify-content: center;
  align-items: center;
  direction: ltr;
}
.text {
  color: white;
  font-size: 64px;
  font-weight: bold;
  text-shadow: 2px 2px 10px rgba(0, 0, 0, 0.7);
  margin: 0 10px;
  line-height: 1.2;
}
.focus-text {
  background-color: #FF4500;
  color: white;
  font-size: 64px;
  font-weight: bold;
  padding: 15px 25px;
  border-radius: 10px;
  display: inline-block;
  margin: 0 20px;
  box-shadow: 0 6px 8px rgba(0, 0, 0, 0.2);
  text-shadow: 3px 3px 15px rgba(0, 0, 0, 0.8);
}
.bottom-right-lines {
  position: absolute;
  bottom: 20px;
  right: -45px;
  display: flex;
  flex-direction: column;
  align-items: flex-end;
}
.line {
  width: 350px;
  height: 8px;
  background-color: #FF4500;
  margin: 10px 0;
  transform: rotate(-220deg);
}
.line-2 {
  width: 350px;
  height: 8px;
  background-color: #ffffff;
  margin: 10px 0;
  transform: rotate(-220deg);
}
";

#[test]
fn default_stylesheet_is_exact() {
    let composed = compose(base());
    let doc = Html::parse_document(&composed.html);
    assert_eq!(style_text(&doc), DEFAULT_STYLESHEET);
}

#[test]
fn unbalanced_color_keeps_every_rule() {
    let mut body = base();
    body["focusTextColor"] = json!("rgb(");
    let composed = compose(body);
    let doc = Html::parse_document(&composed.html);
    assert_eq!(style_text(&doc), DEFAULT_STYLESHEET);
}
