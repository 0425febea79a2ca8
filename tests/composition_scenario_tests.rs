use approx::assert_relative_eq;
use panel_grid::ComposeError;
use panel_grid::core::{
    Axis, Block, Corner, LegendContent, LegendMatch, PLOT_ORIGIN, RenderHandle, Side, Size,
};
use panel_grid::layout::{Composer, ComposedFigure, LabelStyle, extract_shared_legend};
use panel_grid::render::FigureFrame;
use panel_grid::tree::{
    AlignMode, Alignment, CellSpan, CompositionTree, Grid, LegendGroup, LegendPosition, TreePath,
};

fn boxplot(handle: &str, anchor: f64) -> Block {
    Block::new(handle, Size::new(300.0, 250.0)).with_plot_origin(Axis::Horizontal, anchor)
}

fn legend(labels: &[&str]) -> LegendContent {
    LegendContent::new(RenderHandle::new("legend"), Size::new(90.0, 140.0), Side::Right)
        .with_labels(labels.iter().copied())
}

/// Two aligned boxplots in an inner grid above a scatterplot, rows 1 : 1.8.
fn panel_figure() -> CompositionTree {
    panel_figure_with_outer(Alignment::default())
}

fn panel_figure_with_outer(alignment: Alignment) -> CompositionTree {
    let mut tree = CompositionTree::new();
    let outer = tree.add_grid(
        Grid::new(2, 1)
            .with_row_weights(&[1.0, 1.8])
            .with_alignment(alignment),
    );
    let inner = tree.add_grid(
        Grid::new(1, 2).with_alignment(Alignment::new(AlignMode::Shared, AlignMode::None)),
    );
    let left = tree.add_block(boxplot("boxplot-mean", 40.0));
    let right = tree.add_block(boxplot("boxplot-sd", 55.0));
    let scatter = tree.add_block(
        Block::new("scatter", Size::new(600.0, 450.0)).with_plot_origin(Axis::Horizontal, 48.0),
    );

    tree.place(inner, left, CellSpan::at(0, 0)).expect("place left");
    tree.place(inner, right, CellSpan::at(0, 1)).expect("place right");
    tree.label(inner, 0, Corner::TopLeft, "A").expect("label A");
    tree.label(inner, 1, Corner::TopLeft, "B").expect("label B");
    tree.place(outer, inner, CellSpan::at(0, 0)).expect("place inner");
    tree.place(outer, scatter, CellSpan::at(1, 0)).expect("place scatter");
    tree.label(outer, 1, Corner::TopLeft, "C").expect("label C");
    tree.set_root(outer).expect("root");
    tree
}

#[test]
fn nested_panel_figure_splits_rows_by_weight() {
    let tree = panel_figure();
    let figure = Composer::new(&tree)
        .compose(Some(Size::new(600.0, 700.0)))
        .expect("composed");

    let inner = figure
        .grid_at(&TreePath::root().child(0))
        .expect("inner grid");
    let scatter = figure.block("scatter").expect("scatter");
    assert_relative_eq!(inner.cell.height, 700.0 / 2.8, epsilon = 1e-9);
    assert_relative_eq!(scatter.cell.height, 1.8 * 700.0 / 2.8, epsilon = 1e-9);
    assert_relative_eq!(scatter.cell.y, 250.0, epsilon = 1e-9);
    assert_relative_eq!(figure.size.width, 600.0);
}

#[test]
fn nested_panel_figure_aligns_boxplot_plot_areas_within_cells() {
    let tree = panel_figure();
    let figure = Composer::new(&tree)
        .compose(Some(Size::new(600.0, 700.0)))
        .expect("composed");

    let left = figure.block("boxplot-mean").expect("left");
    let right = figure.block("boxplot-sd").expect("right");
    assert_relative_eq!(left.cell.width, 300.0, epsilon = 1e-9);
    assert_relative_eq!(right.cell.width, 300.0, epsilon = 1e-9);

    let left_offset = left
        .anchor_in_cell(Axis::Horizontal, PLOT_ORIGIN)
        .expect("left anchor");
    let right_offset = right
        .anchor_in_cell(Axis::Horizontal, PLOT_ORIGIN)
        .expect("right anchor");
    assert_relative_eq!(left_offset, 55.0, epsilon = 1e-9);
    assert_relative_eq!(right_offset, 55.0, epsilon = 1e-9);
    // Padding comes out of the child's own cell.
    assert_relative_eq!(left.content.x, 15.0, epsilon = 1e-9);
    assert_relative_eq!(left.content.width, 285.0, epsilon = 1e-9);
}

/// Horizontal plot-origin position of `handle` in the exported frame, relative
/// to the block's cell.
fn drawn_plot_origin_in_cell(figure: &ComposedFigure, frame: &FigureFrame, handle: &str) -> f64 {
    let cell = figure.block(handle).expect("placed").cell;
    let draw = frame
        .draws
        .iter()
        .find(|draw| draw.handle.as_str() == handle)
        .expect("drawn");
    draw.anchor_position(Axis::Horizontal, PLOT_ORIGIN)
        .expect("drawn anchor")
        - cell.x
}

#[test]
fn exported_frame_draws_plot_origins_where_layout_aligned_them() {
    let tree = panel_figure();
    let figure = Composer::new(&tree)
        .compose(Some(Size::new(600.0, 700.0)))
        .expect("composed");
    let frame = FigureFrame::from_figure(&figure, LabelStyle::default());
    frame.validate().expect("valid frame");

    for handle in ["boxplot-mean", "boxplot-sd"] {
        let reported = figure
            .block(handle)
            .and_then(|block| block.anchor_in_cell(Axis::Horizontal, PLOT_ORIGIN))
            .expect("reported anchor");
        let drawn = drawn_plot_origin_in_cell(&figure, &frame, handle);
        assert_relative_eq!(drawn, reported, epsilon = 1e-9);
        assert_relative_eq!(drawn, 55.0, epsilon = 1e-9);
    }
}

#[test]
fn aligned_outer_grid_lines_up_with_aligned_nested_grid() {
    let tree = panel_figure_with_outer(Alignment::new(AlignMode::Anchors, AlignMode::None));
    let figure = Composer::new(&tree)
        .compose(Some(Size::new(600.0, 700.0)))
        .expect("composed");

    // The nested grid exposes its boxplots' shared plot origin, 15 + 40.
    let inner = figure
        .grid_at(&TreePath::root().child(0))
        .expect("inner grid");
    assert_relative_eq!(inner.content.x, 0.0, epsilon = 1e-9);
    let position = |handle: &str| {
        figure
            .block(handle)
            .and_then(|block| block.anchor_position(Axis::Horizontal, PLOT_ORIGIN))
            .expect("anchor")
    };
    assert_relative_eq!(position("boxplot-mean"), 55.0, epsilon = 1e-9);
    assert_relative_eq!(position("scatter"), 55.0, epsilon = 1e-9);
    assert_relative_eq!(position("boxplot-sd"), 355.0, epsilon = 1e-9);

    let frame = FigureFrame::from_figure(&figure, LabelStyle::default());
    frame.validate().expect("valid frame");
    for handle in ["boxplot-mean", "boxplot-sd", "scatter"] {
        assert_relative_eq!(
            drawn_plot_origin_in_cell(&figure, &frame, handle),
            55.0,
            epsilon = 1e-9
        );
    }
}

#[test]
fn nested_panel_figure_places_labels_at_cell_corners() {
    let tree = panel_figure();
    let figure = Composer::new(&tree)
        .compose(Some(Size::new(600.0, 700.0)))
        .expect("composed");

    assert_eq!(figure.labels.len(), 3);
    let a = figure.label("A").expect("A");
    let b = figure.label("B").expect("B");
    let c = figure.label("C").expect("C");
    assert_eq!(a.grid, TreePath::root().child(0));
    assert_eq!(c.grid, TreePath::root());
    assert_relative_eq!(a.bounds.x, 4.0, epsilon = 1e-9);
    assert_relative_eq!(b.bounds.x, 304.0, epsilon = 1e-9);
    assert_relative_eq!(c.bounds.y, 254.0, epsilon = 1e-9);
}

#[test]
fn two_row_weight_ratio_holds_for_any_height() {
    for height in [280.0, 700.0, 1_234.5] {
        let mut tree = CompositionTree::new();
        let grid = tree.add_grid(Grid::new(2, 1).with_row_weights(&[1.0, 1.8]));
        let top = tree.add_block(Block::new("top", Size::new(100.0, 100.0)));
        let bottom = tree.add_block(Block::new("bottom", Size::new(100.0, 100.0)));
        tree.place(grid, top, CellSpan::at(0, 0)).expect("place");
        tree.place(grid, bottom, CellSpan::at(1, 0)).expect("place");
        tree.set_root(grid).expect("root");

        let figure = Composer::new(&tree)
            .compose(Some(Size::new(500.0, height)))
            .expect("composed");
        let top = figure.block("top").expect("top");
        let bottom = figure.block("bottom").expect("bottom");
        assert_relative_eq!(top.cell.height, height / 2.8, epsilon = 1e-9);
        assert_relative_eq!(bottom.cell.height, 1.8 * height / 2.8, epsilon = 1e-9);
    }
}

#[test]
fn labels_never_change_layout_rectangles() {
    let tree = panel_figure();
    let output = Some(Size::new(640.0, 720.0));
    let labeled = Composer::new(&tree).compose(output).expect("labeled");
    let unlabeled = Composer::new(&tree.without_labels())
        .compose(output)
        .expect("unlabeled");

    assert!(unlabeled.labels.is_empty());
    assert_eq!(labeled.blocks, unlabeled.blocks);
    assert_eq!(labeled.grids, unlabeled.grids);
    assert_eq!(labeled.size, unlabeled.size);
}

#[test]
fn differing_legend_sets_abort_composition() {
    let mut tree = CompositionTree::new();
    let grid = tree.add_grid(Grid::new(1, 2));
    let a = tree.add_block(boxplot("a", 40.0).with_legend(legend(&["A", "B"])));
    let b = tree.add_block(boxplot("b", 55.0).with_legend(legend(&["A", "B", "C"])));
    tree.place(grid, a, CellSpan::at(0, 0)).expect("place");
    tree.place(grid, b, CellSpan::at(0, 1)).expect("place");
    tree.share_legend(grid, LegendGroup::new([0, 1], LegendPosition::Side(Side::Right)))
        .expect("group");
    tree.set_root(grid).expect("root");

    let err = Composer::new(&tree)
        .compose(Some(Size::new(700.0, 250.0)))
        .expect_err("ambiguous legend");
    match err {
        ComposeError::AmbiguousLegend { path, expected, found } => {
            assert_eq!(path, TreePath::root());
            assert_eq!(expected, vec!["A".to_owned(), "B".to_owned()]);
            assert_eq!(found, vec!["A".to_owned(), "B".to_owned(), "C".to_owned()]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn unordered_matching_accepts_reordered_legends() {
    let mut tree = CompositionTree::new();
    let grid = tree.add_grid(Grid::new(1, 2));
    let a = tree.add_block(boxplot("a", 40.0).with_legend(legend(&["A", "B"])));
    let b = tree.add_block(boxplot("b", 55.0).with_legend(legend(&["B", "A"])));
    tree.place(grid, a, CellSpan::at(0, 0)).expect("place");
    tree.place(grid, b, CellSpan::at(0, 1)).expect("place");
    tree.share_legend(
        grid,
        LegendGroup::new([0, 1], LegendPosition::Side(Side::Bottom))
            .with_matching(LegendMatch::Unordered),
    )
    .expect("group");
    tree.set_root(grid).expect("root");

    let figure = Composer::new(&tree)
        .compose(Some(Size::new(600.0, 400.0)))
        .expect("composed");
    let shared = figure.shared_legends();
    assert_eq!(shared.len(), 1);
    // A bottom legend spans every column of the grid.
    assert_relative_eq!(shared[0].cell.width, 600.0, epsilon = 1e-9);
    assert_relative_eq!(shared[0].cell.height, 140.0, epsilon = 1e-9);
}

#[test]
fn legend_free_group_is_a_no_op() {
    let mut tree = CompositionTree::new();
    let grid = tree.add_grid(Grid::new(1, 2));
    let a = tree.add_block(boxplot("a", 40.0));
    let b = tree.add_block(boxplot("b", 55.0));
    tree.place(grid, a, CellSpan::at(0, 0)).expect("place");
    tree.place(grid, b, CellSpan::at(0, 1)).expect("place");
    tree.share_legend(grid, LegendGroup::new([0, 1], LegendPosition::Side(Side::Right)))
        .expect("group");
    tree.set_root(grid).expect("root");

    let figure = Composer::new(&tree)
        .compose(Some(Size::new(600.0, 250.0)))
        .expect("composed");
    assert!(figure.shared_legends().is_empty());
    assert_relative_eq!(figure.block("b").expect("b").cell.right(), 600.0, epsilon = 1e-9);
}

#[test]
fn extracting_twice_is_idempotent() {
    let path = TreePath::root();
    let a = boxplot("a", 40.0).with_legend(legend(&["A", "B"]));
    let b = boxplot("b", 55.0).with_legend(legend(&["A", "B"]));
    let position = LegendPosition::Side(Side::Right);

    let first = extract_shared_legend(&path, &[(0, &a), (1, &b)], LegendMatch::Ordered, position)
        .expect("first extraction");
    assert!(first.legend.is_some());

    let members: Vec<(usize, &Block)> = first.members.iter().enumerate().collect();
    let second = extract_shared_legend(&path, &members, LegendMatch::Ordered, position)
        .expect("second extraction");
    assert!(second.legend.is_none());
    assert_eq!(second.members, first.members);
}

#[test]
fn partial_legend_group_is_rejected_before_layout() {
    let mut tree = CompositionTree::new();
    let grid = tree.add_grid(Grid::new(1, 2));
    let a = tree.add_block(boxplot("a", 40.0).with_legend(legend(&["A"])));
    let b = tree.add_block(boxplot("b", 55.0));
    tree.place(grid, a, CellSpan::at(0, 0)).expect("place");
    tree.place(grid, b, CellSpan::at(0, 1)).expect("place");
    tree.share_legend(grid, LegendGroup::new([0, 1], LegendPosition::Side(Side::Right)))
        .expect("group");
    tree.set_root(grid).expect("root");

    let err = tree.validate().expect_err("missing legend");
    assert!(err.is_structural());
    assert_eq!(
        err,
        ComposeError::LegendMissing {
            path: TreePath::root(),
            child: 1
        }
    );
}

#[test]
fn overlapping_children_are_rejected() {
    let mut tree = CompositionTree::new();
    let grid = tree.add_grid(Grid::new(2, 2));
    let a = tree.add_block(Block::new("a", Size::new(10.0, 10.0)));
    let b = tree.add_block(Block::new("b", Size::new(10.0, 10.0)));
    tree.place(grid, a, CellSpan::spanning(0, 0, 2, 1)).expect("place");
    tree.place(grid, b, CellSpan::at(1, 0)).expect("place");
    tree.set_root(grid).expect("root");

    let err = Composer::new(&tree)
        .compose(Some(Size::new(100.0, 100.0)))
        .expect_err("overlap");
    assert!(matches!(err, ComposeError::CellOverlap { row: 1, column: 0, .. }));
}

#[test]
fn anchor_padding_that_consumes_a_cell_is_unresolvable() {
    let mut tree = CompositionTree::new();
    let grid = tree.add_grid(
        Grid::new(1, 2).with_alignment(Alignment::new(AlignMode::Shared, AlignMode::None)),
    );
    let a = tree.add_block(
        Block::new("a", Size::new(300.0, 100.0)).with_plot_origin(Axis::Horizontal, 0.0),
    );
    let b = tree.add_block(
        Block::new("b", Size::new(300.0, 100.0)).with_plot_origin(Axis::Horizontal, 250.0),
    );
    tree.place(grid, a, CellSpan::at(0, 0)).expect("place");
    tree.place(grid, b, CellSpan::at(0, 1)).expect("place");
    tree.set_root(grid).expect("root");

    let err = Composer::new(&tree)
        .compose(Some(Size::new(200.0, 100.0)))
        .expect_err("unresolvable");
    assert!(matches!(
        err,
        ComposeError::UnresolvableSize {
            axis: Axis::Horizontal,
            ..
        }
    ));
}
