use std::sync::Arc;

use crate::eval::resolver::StateResolver;
use crate::eval::state::TimelineState;
use crate::foundation::error::{ReelError, ReelResult};
use crate::render::backend::ElementBackend;
use crate::render::display_list::DisplayList;
use crate::render::element::{Element, ElementContext};
use crate::scene::model::ElementKind;
use crate::scene::program::{Program, SceneRef, clamp_program_time, validate_program};

/// What one pipeline tick resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct SceneFrame {
    /// Active scene.
    pub scene_id: String,
    /// Scene-local time the state was resolved at.
    pub local_ms: f64,
    /// Resolved state.
    pub state: TimelineState,
}

struct SceneSlot {
    scene_ref: SceneRef,
    resolver: StateResolver,
    elements: Vec<Box<dyn Element>>,
    visible: bool,
}

/// Mounted elements of every scene of a [`Program`], with exactly one scene visible at a time.
///
/// Elements are created and mounted once in [`Self::compile`]; switching scenes only toggles
/// visibility.
pub struct RendererPipeline {
    program: Arc<dyn Program>,
    ctx: ElementContext,
    slots: Vec<SceneSlot>,
    active: Option<usize>,
    disposed: bool,
}

impl std::fmt::Debug for RendererPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererPipeline")
            .field("program_id", &self.program.program_id())
            .field("scenes", &self.scene_ids())
            .field("active", &self.active_scene_id())
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}

impl RendererPipeline {
    /// Validate `program`, then build and mount every element of every scene.
    ///
    /// Composition errors are returned. An element that fails to build or mount is logged,
    /// cleaned up, and left out; its siblings are unaffected.
    pub fn compile(
        program: Arc<dyn Program>,
        backend: &mut dyn ElementBackend,
        ctx: ElementContext,
    ) -> ReelResult<Self> {
        let scenes = validate_program(&*program)?;

        let mut slots = Vec::with_capacity(scenes.len());
        let mut mounted = 0usize;
        for (scene_ref, scene) in program.scenes().iter().zip(scenes) {
            let mut elements = Vec::with_capacity(scene.elements.len());
            for config in &scene.elements {
                let mut element = match backend.create(config) {
                    Ok(el) => el,
                    Err(e) => {
                        tracing::warn!(
                            scene = %scene.id,
                            kind = %config.kind,
                            error = %e,
                            "element creation failed"
                        );
                        continue;
                    }
                };
                if let Err(e) = element.mount(&ctx) {
                    tracing::warn!(
                        scene = %scene.id,
                        kind = %config.kind,
                        error = %e,
                        "element mount failed"
                    );
                    release(&scene.id, element.as_mut());
                    continue;
                }
                elements.push(element);
            }
            mounted += elements.len();
            slots.push(SceneSlot {
                scene_ref: scene_ref.clone(),
                resolver: scene.resolver(),
                elements,
                visible: false,
            });
        }

        tracing::info!(
            program = program.program_id(),
            backend = backend.name(),
            scenes = slots.len(),
            elements = mounted,
            "pipeline compiled"
        );
        Ok(Self {
            program,
            ctx,
            slots,
            active: None,
            disposed: false,
        })
    }

    /// Advance to `program_time_ms`.
    ///
    /// Switches visibility when the active scene changes, resolves the scene-local state and
    /// updates the active scene's elements only. Returns `None` when no scene covers the time.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn tick(&mut self, program_time_ms: f64, dt_ms: f64) -> ReelResult<Option<SceneFrame>> {
        if self.disposed {
            return Err(ReelError::element("tick on a disposed pipeline"));
        }
        let t = clamp_program_time(program_time_ms, self.program.duration_ms());
        let next = self
            .program
            .scene_at(t)
            .and_then(|r| self.slots.iter().position(|s| s.scene_ref.id == r.id));

        if next != self.active {
            if let Some(old) = self.active {
                self.slots[old].visible = false;
            }
            if let Some(new) = next {
                self.slots[new].visible = true;
            }
            tracing::debug!(
                from = self.active.map(|i| self.slots[i].scene_ref.id.as_str()),
                to = next.map(|i| self.slots[i].scene_ref.id.as_str()),
                program_time_ms = t,
                "scene switch"
            );
            self.active = next;
        }

        let Some(idx) = next else {
            return Ok(None);
        };
        let ctx = self.ctx;
        let slot = &mut self.slots[idx];
        let local_ms = slot.scene_ref.local_time(t);
        let state = slot.resolver.state_at(local_ms);
        for element in &mut slot.elements {
            if let Err(e) = element.update(dt_ms, &state, &ctx) {
                tracing::warn!(
                    scene = %slot.scene_ref.id,
                    kind = %element.kind(),
                    error = %e,
                    "element update failed"
                );
            }
        }
        Ok(Some(SceneFrame {
            scene_id: slot.scene_ref.id.clone(),
            local_ms,
            state,
        }))
    }

    /// Draw commands of the visible scene, sorted by z (stable).
    pub fn display_list(&self) -> DisplayList {
        let mut out = DisplayList::new();
        if let Some(slot) = self.slots.iter().find(|s| s.visible) {
            for element in &slot.elements {
                element.render(&mut out);
            }
        }
        out.sort_by_z();
        out
    }

    /// Dispose then destroy every element of every scene. Idempotent.
    ///
    /// Element failures are logged and do not stop the teardown of the rest.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.disposed = true;
        let mut released = 0usize;
        for slot in &mut self.slots {
            slot.visible = false;
            for mut element in slot.elements.drain(..) {
                release(&slot.scene_ref.id, element.as_mut());
                released += 1;
            }
        }
        self.active = None;
        tracing::info!(
            program = self.program.program_id(),
            elements = released,
            "pipeline disposed"
        );
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn program(&self) -> &Arc<dyn Program> {
        &self.program
    }

    pub fn context(&self) -> &ElementContext {
        &self.ctx
    }

    pub fn active_scene_id(&self) -> Option<&str> {
        self.active.map(|i| self.slots[i].scene_ref.id.as_str())
    }

    pub fn is_scene_visible(&self, scene_id: &str) -> bool {
        self.slots
            .iter()
            .any(|s| s.visible && s.scene_ref.id == scene_id)
    }

    /// Scene ids in program order.
    pub fn scene_ids(&self) -> Vec<&str> {
        self.slots.iter().map(|s| s.scene_ref.id.as_str()).collect()
    }

    /// Kinds of the live elements of `scene_id`, in author order.
    pub fn element_kinds(&self, scene_id: &str) -> Option<Vec<ElementKind>> {
        self.slots
            .iter()
            .find(|s| s.scene_ref.id == scene_id)
            .map(|s| s.elements.iter().map(|e| e.kind()).collect())
    }
}

impl Drop for RendererPipeline {
    fn drop(&mut self) {
        self.dispose();
    }
}

fn release(scene_id: &str, element: &mut dyn Element) {
    let kind = element.kind();
    if let Err(e) = element.dispose() {
        tracing::warn!(scene = scene_id, %kind, error = %e, "element dispose failed");
    }
    if let Err(e) = element.destroy() {
        tracing::warn!(scene = scene_id, %kind, error = %e, "element destroy failed");
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
