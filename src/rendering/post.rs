//! The 1080×1080 social post template.

use super::markup::{self, Element};
use super::style::{self, Rule, Stylesheet};
use super::{ComposedDocument, POST_VIEWPORT};
use crate::request::{Direction, PostSpec, DEFAULT_FOCUS_COLOR};

/// Compose the post document for a validated request.
///
/// Layers, back to front: dimmed background image, top and bottom gradient
/// scrims, logo badge, the centered text row and the two accent lines in the
/// bottom-right corner.
pub fn compose(post: &PostSpec) -> ComposedDocument {
    let focus_color = if style::is_safe_color(&post.focus_text_color) {
        post.focus_text_color.as_str()
    } else {
        log::warn!(
            "Rejected focusTextColor {:?}; using {}",
            post.focus_text_color,
            DEFAULT_FOCUS_COLOR
        );
        DEFAULT_FOCUS_COLOR
    };

    let css = stylesheet(post, focus_color).to_css();

    let head = Element::new("head")
        .child(Element::new("meta").attr("charset", "UTF-8"))
        .child(
            Element::new("meta")
                .attr("name", "viewport")
                .attr("content", "width=device-width, initial-scale=1.0"),
        )
        .child(Element::new("style").raw(css));

    let text_row = Element::new("div")
        .class("text-overlay")
        .child(Element::new("div").class("text").text(post.text01.as_str()))
        .child(Element::new("div").class("focus-text").text(post.focus_text.as_str()))
        .child(Element::new("div").class("text").text(post.text02.as_str()));

    let lines = Element::new("div")
        .class("bottom-right-lines")
        .child(Element::new("div").class("line"))
        .child(Element::new("div").class("line-2"));

    let container = Element::new("div")
        .class("container")
        .child(Element::new("div").class("image"))
        .child(Element::new("div").class("overlay-top"))
        .child(Element::new("div").class("overlay-bottom"))
        .child(Element::new("div").class("logo"))
        .child(text_row)
        .child(lines);

    let root = Element::new("html")
        .attr("lang", post.language.as_str())
        .attr("dir", post.direction.as_str())
        .child(head)
        .child(Element::new("body").child(container));

    ComposedDocument {
        html: markup::to_html(&root),
        viewport: POST_VIEWPORT,
        assets: vec![post.image_url.clone(), post.logo_url.clone()],
    }
}

fn stylesheet(post: &PostSpec, focus_color: &str) -> Stylesheet {
    let logo = Rule::new(".logo").set("position", "absolute").set("top", "20px");
    // Logo sits opposite the reading start.
    let logo = match post.direction {
        Direction::Ltr => logo.set("right", "20px"),
        Direction::Rtl => logo.set("left", "20px"),
    };
    let logo = logo
        .set("width", "100px")
        .set("height", "100px")
        .url("background-image", post.logo_url.as_str())
        .set("background-size", "contain")
        .set("background-repeat", "no-repeat")
        .set("background-position", "center");

    Stylesheet::new()
        .rule(
            Rule::new("body")
                .set("margin", "0")
                .set("padding", "0")
                .set("font-family", "Arial, sans-serif")
                .set("position", "relative"),
        )
        .rule(
            Rule::new(".container")
                .set("position", "relative")
                .set("width", "1080px")
                .set("height", "1080px")
                .set("overflow", "hidden"),
        )
        .rule(
            Rule::new(".image")
                .set("width", "100%")
                .set("height", "100%")
                .url("background-image", post.image_url.as_str())
                .set("background-size", "cover")
                .set("background-position", "center")
                .set("filter", "brightness(0.7)"),
        )
        .rule(
            Rule::new(".overlay-top, .overlay-bottom")
                .set("position", "absolute")
                .set("left", "0")
                .set("right", "0")
                .set("height", "100px")
                .set("background", "linear-gradient(to bottom, rgba(0, 0, 0, 0.5), transparent)"),
        )
        .rule(
            Rule::new(".overlay-bottom")
                .set("bottom", "0")
                .set("background", "linear-gradient(to top, rgba(0, 0, 0, 0.5), transparent)"),
        )
        .rule(Rule::new(".overlay-top").set("top", "0"))
        .rule(logo)
        .rule(
            Rule::new(".text-overlay")
                .set("position", "absolute")
                .set("bottom", "100px")
                .set("left", "50%")
                .set("transform", "translateX(-50%)")
                .set("text-align", "center")
                .set("width", "90%")
                .set("display", "flex")
                .set("flex-wrap", "wrap")
                .set("justify-content", "center")
                .set("align-items", "center")
                .set("direction", post.direction.as_str()),
        )
        .rule(
            Rule::new(".text")
                .set("color", "white")
                .set("font-size", "64px")
                .set("font-weight", "bold")
                .set("text-shadow", "2px 2px 10px rgba(0, 0, 0, 0.7)")
                .set("margin", "0 10px")
                .set("line-height", "1.2"),
        )
        .rule(
            Rule::new(".focus-text")
                .color("background-color", focus_color)
                .set("color", "white")
                .set("font-size", "64px")
                .set("font-weight", "bold")
                .set("padding", "15px 25px")
                .set("border-radius", "10px")
                .set("display", "inline-block")
                .set("margin", "0 20px")
                .set("box-shadow", "0 6px 8px rgba(0, 0, 0, 0.2)")
                .set("text-shadow", "3px 3px 15px rgba(0, 0, 0, 0.8)"),
        )
        .rule(
            Rule::new(".bottom-right-lines")
                .set("position", "absolute")
                .set("bottom", "20px")
                .set("right", "-45px")
                .set("display", "flex")
                .set("flex-direction", "column")
                .set("align-items", "flex-end"),
        )
        .rule(
            Rule::new(".line")
                .set("width", "350px")
                .set("height", "8px")
                .color("background-color", focus_color)
                .set("margin", "10px 0")
                .set("transform", "rotate(-220deg)"),
        )
        .rule(
            Rule::new(".line-2")
                .set("width", "350px")
                .set("height", "8px")
                .set("background-color", "#ffffff")
                .set("margin", "10px 0")
                .set("transform", "rotate(-220deg)"),
        )
}
