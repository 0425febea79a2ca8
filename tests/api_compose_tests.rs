use panel_grid::api::{CompositionDeclarationJsonContractV1, compose_many};
use panel_grid::core::{
    Axis, Block, Corner, LegendContent, PLOT_ORIGIN, RenderHandle, Side, Size,
};
use panel_grid::layout::ComposedFigure;
use panel_grid::render::{ExportFormat, ExportTarget, NullExporter};
use panel_grid::tree::{
    AlignMode, Alignment, CellSpan, CompositionTree, Grid, LabelSequence, LegendGroup,
    LegendPosition,
};
use panel_grid::{ComposeConfig, ComposeError, FigureComposer};

fn legend(labels: &[&str]) -> LegendContent {
    LegendContent::new(RenderHandle::new("legend"), Size::new(60.0, 100.0), Side::Right)
        .with_labels(labels.iter().copied())
}

fn side_by_side(width: f64) -> CompositionTree {
    let mut tree = CompositionTree::new();
    let grid = tree.add_grid(Grid::new(1, 2));
    let a = tree.add_block(
        Block::new("a", Size::new(width, 200.0))
            .with_plot_origin(Axis::Horizontal, 30.0)
            .with_legend(legend(&["treated", "control"])),
    );
    let b = tree.add_block(
        Block::new("b", Size::new(width, 200.0))
            .with_plot_origin(Axis::Horizontal, 45.0)
            .with_legend(legend(&["treated", "control"])),
    );
    tree.place(grid, a, CellSpan::at(0, 0)).expect("place");
    tree.place(grid, b, CellSpan::at(0, 1)).expect("place");
    tree.auto_label(grid, LabelSequence::UpperAlpha, Corner::TopLeft)
        .expect("labels");
    tree.share_legend(grid, LegendGroup::new([0, 1], LegendPosition::Side(Side::Right)))
        .expect("group");
    tree.set_root(grid).expect("root");
    tree
}

#[test]
fn compose_and_export_hands_one_frame_to_exporter() {
    let target = ExportTarget::from_path("figures/panels.tiff")
        .expect("target")
        .with_dpi(300)
        .with_compression("lzw");
    let config = ComposeConfig::new()
        .with_output_size(700.0, 240.0)
        .with_export_target(target.clone());
    let mut composer = FigureComposer::new(NullExporter::default(), config).expect("composer");

    let figure = composer
        .compose_and_export(&side_by_side(300.0))
        .expect("exported");
    assert_eq!(figure.blocks.len(), 3);
    assert_eq!(figure.labels.len(), 2);

    let exporter = composer.into_exporter();
    assert_eq!(exporter.export_count, 1);
    assert_eq!(exporter.last_draw_count, 3);
    assert_eq!(exporter.last_text_count, 2);
    let exported = exporter.last_target.expect("target passed through");
    assert_eq!(exported.format, ExportFormat::Tiff);
    assert_eq!(exported, target);
}

#[test]
fn failed_composition_never_reaches_exporter() {
    let mut tree = CompositionTree::new();
    let grid = tree.add_grid(Grid::new(1, 2));
    let a = tree.add_block(
        Block::new("a", Size::new(300.0, 200.0)).with_legend(legend(&["A", "B"])),
    );
    let b = tree.add_block(
        Block::new("b", Size::new(300.0, 200.0)).with_legend(legend(&["A", "B", "C"])),
    );
    tree.place(grid, a, CellSpan::at(0, 0)).expect("place");
    tree.place(grid, b, CellSpan::at(0, 1)).expect("place");
    tree.share_legend(grid, LegendGroup::new([0, 1], LegendPosition::Side(Side::Right)))
        .expect("group");
    tree.set_root(grid).expect("root");

    let mut composer =
        FigureComposer::new(NullExporter::default(), ComposeConfig::new()).expect("composer");
    let err = composer.compose_and_export(&tree).expect_err("ambiguous");
    assert!(matches!(err, ComposeError::AmbiguousLegend { .. }));
    assert_eq!(composer.exporter().export_count, 0);
}

#[test]
fn invalid_config_is_rejected_up_front() {
    let config = ComposeConfig::new().with_output_size(0.0, 100.0);
    assert!(FigureComposer::new(NullExporter::default(), config).is_err());

    let config = ComposeConfig::new().with_label_font_size(-1.0);
    assert!(FigureComposer::new(NullExporter::default(), config).is_err());
}

#[test]
fn composed_figure_can_be_reused_as_a_block() {
    let composer =
        FigureComposer::new(NullExporter::default(), ComposeConfig::new()).expect("composer");
    let figure = composer.compose(&side_by_side(300.0)).expect("inner figure");
    let reused = figure.to_block("panels");
    assert_eq!(reused.size, figure.size);
    // Only the leftmost panel's plot origin sits on the composite's leading edge.
    assert_eq!(reused.anchor(Axis::Horizontal, PLOT_ORIGIN), Some(30.0));
    assert_eq!(reused.anchor(Axis::Vertical, PLOT_ORIGIN), None);

    let mut outer = CompositionTree::new();
    let alignment = Alignment::new(AlignMode::Anchors, AlignMode::None);
    let grid = outer.add_grid(Grid::new(2, 1).with_alignment(alignment));
    let top = outer.add_block(reused);
    let bottom = outer.add_block(
        Block::new("scatter", Size::new(660.0, 400.0)).with_plot_origin(Axis::Horizontal, 50.0),
    );
    outer.place(grid, top, CellSpan::at(0, 0)).expect("place");
    outer.place(grid, bottom, CellSpan::at(1, 0)).expect("place");
    outer.set_root(grid).expect("root");

    let composed = composer.compose(&outer).expect("outer figure");
    assert_eq!(composed.blocks.len(), 2);
    let panels = composed.block("panels").expect("panels");
    let scatter = composed.block("scatter").expect("scatter");
    assert_eq!(panels.anchor_position(Axis::Horizontal, PLOT_ORIGIN), Some(50.0));
    assert_eq!(scatter.anchor_position(Axis::Horizontal, PLOT_ORIGIN), Some(50.0));
}

#[test]
fn compose_many_preserves_input_order() {
    let trees: Vec<CompositionTree> = [200.0, 300.0, 400.0]
        .into_iter()
        .map(side_by_side)
        .collect();
    let results = compose_many(&trees, &ComposeConfig::new());

    assert_eq!(results.len(), 3);
    let widths: Vec<f64> = results
        .iter()
        .map(|result| result.as_ref().expect("composed").size.width)
        .collect();
    // Intrinsic width: two legend-free panels plus the 60-unit legend column.
    assert_eq!(widths, vec![2.0 * 140.0 + 60.0, 2.0 * 240.0 + 60.0, 2.0 * 340.0 + 60.0]);

    let composer =
        FigureComposer::new(NullExporter::default(), ComposeConfig::new()).expect("composer");
    for (tree, result) in trees.iter().zip(&results) {
        let single = composer.compose(tree).expect("single");
        assert_eq!(result.as_ref().expect("composed"), &single);
    }
}

#[test]
fn declaration_json_builds_and_composes_nested_tree() {
    let input = r#"{
        "schema_version": 1,
        "config": {"output_size": {"width": 600.0, "height": 700.0}},
        "root": {
            "kind": "grid",
            "rows": [{"kind": "relative", "value": 1.0}, {"kind": "relative", "value": 1.8}],
            "columns": [{"kind": "relative", "value": 1.0}],
            "children": [
                {
                    "cell": {"row": 0, "column": 0},
                    "node": {
                        "kind": "grid",
                        "rows": [{"kind": "relative", "value": 1.0}],
                        "columns": [{"kind": "relative", "value": 1.0}, {"kind": "relative", "value": 1.0}],
                        "alignment": {"horizontal": "align-shared"},
                        "children": [
                            {
                                "cell": {"row": 0, "column": 0},
                                "node": {
                                    "kind": "block",
                                    "handle": "left",
                                    "size": {"width": 300.0, "height": 250.0},
                                    "anchors": [{"axis": "horizontal", "name": "plot-origin", "offset": 40.0}]
                                }
                            },
                            {
                                "cell": {"row": 0, "column": 1},
                                "node": {
                                    "kind": "block",
                                    "handle": "right",
                                    "size": {"width": 300.0, "height": 250.0},
                                    "anchors": [{"axis": "horizontal", "name": "plot-origin", "offset": 55.0}]
                                }
                            }
                        ],
                        "auto_labels": {"sequence": "upper_alpha"}
                    }
                },
                {
                    "cell": {"row": 1, "column": 0},
                    "node": {"kind": "block", "handle": "scatter", "size": {"width": 600.0, "height": 450.0}}
                }
            ],
            "labels": [{"child": 1, "corner": "top-left", "text": "C"}]
        }
    }"#;

    let declaration = CompositionDeclarationJsonContractV1::from_json_str(input).expect("parse");
    let tree = declaration.to_tree().expect("tree");
    let composer = FigureComposer::new(NullExporter::default(), declaration.config.clone())
        .expect("composer");
    let figure = composer.compose(&tree).expect("composed");

    let left = figure.block("left").expect("left");
    let right = figure.block("right").expect("right");
    assert_eq!(
        left.anchor_in_cell(Axis::Horizontal, "plot-origin"),
        right.anchor_in_cell(Axis::Horizontal, "plot-origin")
    );
    assert!(figure.label("A").is_some());
    assert!(figure.label("B").is_some());
    assert!(figure.label("C").is_some());

    let json = declaration.to_json_pretty().expect("serialize");
    let reparsed = CompositionDeclarationJsonContractV1::from_json_str(&json).expect("reparse");
    assert_eq!(reparsed, declaration);
}

#[test]
fn composed_figure_contract_accepts_bare_and_versioned_payloads() {
    let composer =
        FigureComposer::new(NullExporter::default(), ComposeConfig::new()).expect("composer");
    let figure = composer.compose(&side_by_side(300.0)).expect("composed");

    let versioned = figure.to_json_contract_v1_pretty().expect("contract");
    assert!(versioned.contains("\"schema_version\": 1"));
    let restored = ComposedFigure::from_json_compat_str(&versioned).expect("versioned");
    assert_eq!(restored, figure);

    let bare = serde_json::to_string(&figure).expect("bare json");
    let restored = ComposedFigure::from_json_compat_str(&bare).expect("bare");
    assert_eq!(restored, figure);

    let future = versioned.replace("\"schema_version\": 1", "\"schema_version\": 9");
    assert!(ComposedFigure::from_json_compat_str(&future).is_err());
}
