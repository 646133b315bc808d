// Copyright 2026 the Veneer Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Structural conformance for the SVG backend: every case runs without
//! panicking and yields a well-formed, non-trivial document. Pixel
//! predicates do not apply to a document backend.

#![cfg(feature = "svg")]

use veneer_conformance::cases::{DEFAULT_HEIGHT, DEFAULT_WIDTH, selected_cases};
use veneer_draw::DrawCanvas;
use veneer_draw_svg::SvgCanvas;

mod common;

#[test]
fn documents_are_well_formed() {
    for case in selected_cases() {
        let mut canvas =
            SvgCanvas::new(DEFAULT_WIDTH, DEFAULT_HEIGHT).expect("svg canvas binds");
        case.run(&mut canvas);
        canvas.flush();
        let doc = canvas.document();
        assert!(doc.starts_with("<svg "), "case `{}`", case.name());
        assert!(doc.ends_with("</svg>"), "case `{}`", case.name());
        assert!(
            doc.len() > 200,
            "case `{}` produced a suspiciously empty document",
            case.name()
        );
        let opens = doc.matches("<g ").count();
        let closes = doc.matches("</g>").count();
        assert_eq!(opens, closes, "case `{}`: unbalanced clip groups", case.name());
    }
}
