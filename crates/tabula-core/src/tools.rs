//! Tool system: input routing and the closed set of tools.

use crate::elements::{DrawingElement, Element};
use crate::input::{KeyEvent, Modifiers, PointerEvent, PointerKind};
use crate::selection::SelectionManager;
use crate::store::ElementStore;
use crate::viewport::Viewport;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Stroke simplification tolerance applied when a drawing is committed.
const DRAW_SIMPLIFY_TOLERANCE: f64 = 0.5;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Draw,
}

/// Shared collaborators handed to the active tool on every event.
pub struct ToolCtx<'a> {
    pub viewport: &'a mut Viewport,
    pub store: &'a mut dyn ElementStore,
}

/// A tool receiving routed input. Pointer positions arrive both raw
/// (screen) and converted through the viewport (canvas); most tools only
/// care about the canvas point.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Release any gesture state this tool owns. Called before another
    /// tool becomes active, so a switch mid-gesture cannot leave stale
    /// snapshots behind.
    fn deactivate(&mut self);

    fn pointer_down(
        &mut self,
        ctx: &mut ToolCtx<'_>,
        screen: Point,
        canvas: Point,
        pointer: PointerKind,
        modifiers: Modifiers,
    );

    fn pointer_move(
        &mut self,
        ctx: &mut ToolCtx<'_>,
        screen: Point,
        canvas: Point,
        pointer: PointerKind,
        modifiers: Modifiers,
    );

    fn pointer_up(
        &mut self,
        ctx: &mut ToolCtx<'_>,
        screen: Point,
        canvas: Point,
        pointer: PointerKind,
        modifiers: Modifiers,
    );

    fn key_down(&mut self, _ctx: &mut ToolCtx<'_>, _key: &str) {}

    fn key_up(&mut self, _ctx: &mut ToolCtx<'_>, _key: &str) {}
}

/// The selection tool: hit-testing, drag/resize/rotate via
/// [`SelectionManager`].
#[derive(Debug, Default)]
pub struct SelectTool {
    pub selection: SelectionManager,
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn deactivate(&mut self) {
        self.selection.cancel();
    }

    fn pointer_down(
        &mut self,
        ctx: &mut ToolCtx<'_>,
        _screen: Point,
        canvas: Point,
        pointer: PointerKind,
        modifiers: Modifiers,
    ) {
        self.selection.start_gesture(
            ctx.store,
            canvas,
            ctx.viewport.scale,
            pointer,
            modifiers.shift,
        );
    }

    fn pointer_move(
        &mut self,
        ctx: &mut ToolCtx<'_>,
        _screen: Point,
        canvas: Point,
        _pointer: PointerKind,
        _modifiers: Modifiers,
    ) {
        self.selection.update_gesture(ctx.store, canvas);
    }

    fn pointer_up(
        &mut self,
        _ctx: &mut ToolCtx<'_>,
        _screen: Point,
        _canvas: Point,
        _pointer: PointerKind,
        _modifiers: Modifiers,
    ) {
        self.selection.stop_gesture();
    }

    fn key_down(&mut self, ctx: &mut ToolCtx<'_>, key: &str) {
        match key {
            "Escape" => self.selection.cancel(),
            "Delete" | "Backspace" => self.selection.delete_selected(ctx.store),
            _ => {}
        }
    }
}

/// The pan tool: drags the viewport offset in screen space.
#[derive(Debug, Default)]
pub struct PanTool {
    last_screen: Option<Point>,
}

impl Tool for PanTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Pan
    }

    fn deactivate(&mut self) {
        self.last_screen = None;
    }

    fn pointer_down(
        &mut self,
        _ctx: &mut ToolCtx<'_>,
        screen: Point,
        _canvas: Point,
        _pointer: PointerKind,
        _modifiers: Modifiers,
    ) {
        self.last_screen = Some(screen);
    }

    fn pointer_move(
        &mut self,
        ctx: &mut ToolCtx<'_>,
        screen: Point,
        _canvas: Point,
        _pointer: PointerKind,
        _modifiers: Modifiers,
    ) {
        if let Some(last) = self.last_screen {
            ctx.viewport.pan(screen - last);
            self.last_screen = Some(screen);
        }
    }

    fn pointer_up(
        &mut self,
        _ctx: &mut ToolCtx<'_>,
        _screen: Point,
        _canvas: Point,
        _pointer: PointerKind,
        _modifiers: Modifiers,
    ) {
        self.last_screen = None;
    }
}

/// The freehand drawing tool: accumulates canvas points and commits a
/// drawing element on release.
#[derive(Debug, Default)]
pub struct DrawTool {
    capture: Option<Vec<Point>>,
    stroke_width: Option<f64>,
}

impl DrawTool {
    /// Stroke width for the next drawing.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_width = Some(width);
    }

    fn commit(&mut self, ctx: &mut ToolCtx<'_>) {
        let Some(points) = self.capture.take() else {
            return;
        };
        if points.len() < 2 {
            return;
        }
        let stroke_width = self
            .stroke_width
            .unwrap_or(DrawingElement::DEFAULT_STROKE_WIDTH);
        let mut drawing = DrawingElement::from_canvas_points(points, stroke_width);
        drawing.simplify(DRAW_SIMPLIFY_TOLERANCE);
        ctx.store.add_element(Element::Drawing(drawing));
    }
}

impl Tool for DrawTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Draw
    }

    fn deactivate(&mut self) {
        // An interrupted stroke is discarded, not committed.
        self.capture = None;
    }

    fn pointer_down(
        &mut self,
        _ctx: &mut ToolCtx<'_>,
        _screen: Point,
        canvas: Point,
        _pointer: PointerKind,
        _modifiers: Modifiers,
    ) {
        self.capture = Some(vec![canvas]);
    }

    fn pointer_move(
        &mut self,
        _ctx: &mut ToolCtx<'_>,
        _screen: Point,
        canvas: Point,
        _pointer: PointerKind,
        _modifiers: Modifiers,
    ) {
        if let Some(points) = &mut self.capture {
            points.push(canvas);
        }
    }

    fn pointer_up(
        &mut self,
        ctx: &mut ToolCtx<'_>,
        _screen: Point,
        canvas: Point,
        _pointer: PointerKind,
        _modifiers: Modifiers,
    ) {
        if let Some(points) = &mut self.capture {
            points.push(canvas);
        }
        self.commit(ctx);
    }

    fn key_down(&mut self, _ctx: &mut ToolCtx<'_>, key: &str) {
        if key == "Escape" {
            self.capture = None;
        }
    }
}

/// Routes normalized input to the active tool. Screen coordinates are
/// converted through the viewport before any tool logic runs. Holds no
/// geometry state of its own.
#[derive(Debug, Default)]
pub struct ToolDispatcher {
    active: ToolKind,
    select: SelectTool,
    pan: PanTool,
    draw: DrawTool,
}

impl ToolDispatcher {
    /// Create a dispatcher with the select tool active.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active tool kind.
    pub fn active_kind(&self) -> ToolKind {
        self.active
    }

    /// The selection backing the select tool.
    pub fn selection(&self) -> &SelectionManager {
        &self.select.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.select.selection
    }

    /// The drawing tool, for stroke configuration.
    pub fn draw_tool_mut(&mut self) -> &mut DrawTool {
        &mut self.draw
    }

    /// Switch tools. The outgoing tool is deactivated first and must
    /// release any gesture state it owns.
    pub fn set_tool(&mut self, kind: ToolKind) {
        if kind == self.active {
            return;
        }
        self.active_tool_mut().deactivate();
        log::debug!("tools: {:?} -> {:?}", self.active, kind);
        self.active = kind;
    }

    fn active_tool_mut(&mut self) -> &mut dyn Tool {
        match self.active {
            ToolKind::Select => &mut self.select,
            ToolKind::Pan => &mut self.pan,
            ToolKind::Draw => &mut self.draw,
        }
    }

    /// Route a pointer event to the active tool.
    pub fn handle_pointer_event(
        &mut self,
        viewport: &mut Viewport,
        store: &mut dyn ElementStore,
        event: &PointerEvent,
    ) {
        let (screen, pointer, modifiers) = event.parts();
        let canvas = viewport.screen_to_canvas(screen);
        let mut ctx = ToolCtx { viewport, store };
        let tool = self.active_tool_mut();
        match event {
            PointerEvent::Down { .. } => {
                tool.pointer_down(&mut ctx, screen, canvas, pointer, modifiers)
            }
            PointerEvent::Move { .. } => {
                tool.pointer_move(&mut ctx, screen, canvas, pointer, modifiers)
            }
            PointerEvent::Up { .. } => tool.pointer_up(&mut ctx, screen, canvas, pointer, modifiers),
        }
    }

    /// Route a key event to the active tool.
    pub fn handle_key_event(
        &mut self,
        viewport: &mut Viewport,
        store: &mut dyn ElementStore,
        event: &KeyEvent,
    ) {
        let mut ctx = ToolCtx { viewport, store };
        let tool = self.active_tool_mut();
        match event {
            KeyEvent::Pressed(key) => tool.key_down(&mut ctx, key),
            KeyEvent::Released(key) => tool.key_up(&mut ctx, key),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::elements::{ElementGeometry, ImageElement, NoteElement};
    use crate::selection::GesturePhase;
    use crate::store::MemoryStore;
    use kurbo::Vec2;

    fn setup() -> (Viewport, MemoryStore, ToolDispatcher) {
        (Viewport::new(), MemoryStore::new(), ToolDispatcher::new())
    }

    #[test]
    fn test_pointer_events_are_converted_to_canvas_space() {
        let (mut viewport, mut store, mut dispatcher) = setup();
        viewport.scale = 2.0;
        viewport.offset = Vec2::new(100.0, 0.0);

        let element = NoteElement::new(Point::new(50.0, 50.0));
        let id = element.id();
        store.add_element(Element::Note(element));

        // Canvas (60, 60) renders at screen (220, 120) under this view.
        let screen = viewport.canvas_to_screen(Point::new(60.0, 60.0));
        dispatcher.handle_pointer_event(&mut viewport, &mut store, &PointerEvent::mouse_down(screen));

        assert!(dispatcher.selection().is_selected(id));
        assert_eq!(dispatcher.selection().phase(), GesturePhase::Dragging);
    }

    #[test]
    fn test_drag_through_dispatcher_while_zoomed() {
        let (mut viewport, mut store, mut dispatcher) = setup();
        viewport.scale = 2.0;

        let element = NoteElement::new(Point::new(0.0, 0.0));
        let id = element.id();
        store.add_element(Element::Note(element));

        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_down(Point::new(100.0, 100.0)),
        );
        // 40 screen pixels is 20 canvas units at scale 2.
        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_move(Point::new(140.0, 100.0)),
        );
        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_up(Point::new(140.0, 100.0)),
        );

        let position = store.element(id).unwrap().position();
        assert!((position.x - 20.0).abs() < 1e-9);
        assert!((position.y - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_tool_switch_cancels_gesture() {
        let (mut viewport, mut store, mut dispatcher) = setup();
        store.add_element(Element::Note(NoteElement::new(Point::new(0.0, 0.0))));

        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_down(Point::new(50.0, 50.0)),
        );
        assert_eq!(dispatcher.selection().phase(), GesturePhase::Dragging);

        dispatcher.set_tool(ToolKind::Pan);
        assert_eq!(dispatcher.selection().phase(), GesturePhase::Idle);
    }

    #[test]
    fn test_pan_tool() {
        let (mut viewport, mut store, mut dispatcher) = setup();
        dispatcher.set_tool(ToolKind::Pan);

        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_down(Point::new(10.0, 10.0)),
        );
        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_move(Point::new(35.0, 20.0)),
        );
        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_up(Point::new(35.0, 20.0)),
        );

        assert!((viewport.offset.x - 25.0).abs() < 1e-9);
        assert!((viewport.offset.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_draw_tool_creates_element() {
        let (mut viewport, mut store, mut dispatcher) = setup();
        dispatcher.set_tool(ToolKind::Draw);

        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_down(Point::new(10.0, 10.0)),
        );
        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_move(Point::new(60.0, 40.0)),
        );
        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_up(Point::new(110.0, 10.0)),
        );

        assert_eq!(store.len(), 1);
        let element = store.elements()[0];
        assert_eq!(element.kind(), crate::elements::ElementKind::Drawing);
        let bounds = element.bounding_box();
        assert!((bounds.x0 - 10.0).abs() < 1e-9);
        assert!((bounds.x1 - 110.0).abs() < 1e-9);
    }

    #[test]
    fn test_draw_escape_discards_stroke() {
        let (mut viewport, mut store, mut dispatcher) = setup();
        dispatcher.set_tool(ToolKind::Draw);

        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_down(Point::new(10.0, 10.0)),
        );
        dispatcher.handle_key_event(
            &mut viewport,
            &mut store,
            &KeyEvent::Pressed("Escape".to_string()),
        );
        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_up(Point::new(60.0, 40.0)),
        );

        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_key_removes_selection() {
        let (mut viewport, mut store, mut dispatcher) = setup();
        let element = NoteElement::new(Point::new(0.0, 0.0));
        let id = element.id();
        store.add_element(Element::Note(element));

        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_down(Point::new(50.0, 50.0)),
        );
        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_up(Point::new(50.0, 50.0)),
        );
        dispatcher.handle_key_event(
            &mut viewport,
            &mut store,
            &KeyEvent::Pressed("Delete".to_string()),
        );

        assert!(store.element(id).is_none());
        assert!(dispatcher.selection().selected().is_empty());
    }

    #[test]
    fn test_escape_cancels_gesture() {
        let (mut viewport, mut store, mut dispatcher) = setup();
        store.add_element(Element::Image(ImageElement::new(
            Point::ZERO,
            "img".to_string(),
            100,
            100,
        )));

        dispatcher.handle_pointer_event(
            &mut viewport,
            &mut store,
            &PointerEvent::mouse_down(Point::new(50.0, 50.0)),
        );
        assert_eq!(dispatcher.selection().phase(), GesturePhase::Dragging);

        dispatcher.handle_key_event(
            &mut viewport,
            &mut store,
            &KeyEvent::Pressed("Escape".to_string()),
        );
        assert_eq!(dispatcher.selection().phase(), GesturePhase::Idle);
    }
}
