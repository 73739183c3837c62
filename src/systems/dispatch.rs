//! Hand the tick's output to the renderer collaborator, if one is attached.

use bevy_ecs::prelude::*;

use crate::resources::output::OutputFrame;
use crate::resources::renderer::RendererBridge;

pub fn dispatch_frame_system(output: Res<OutputFrame>, bridge: Option<ResMut<RendererBridge>>) {
    let Some(mut bridge) = bridge else {
        return;
    };
    bridge.dispatch(output.to_render_frame());
}
