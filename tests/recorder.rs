use anyhow::Result;
use ash::vk;
use ash::vk::Handle;

use umbra::command_buffer::command_log::Command;
use umbra::{record_frame, CommandLog, SceneMode};

use framework::handles;

mod framework;

fn binds_pipeline(pass: &[Command], raw: u64) -> bool {
    pass.iter()
        .any(|command| matches!(command, Command::BindPipeline(pipeline) if *pipeline == vk::Pipeline::from_raw(raw)))
}

fn count_begins(log: &CommandLog) -> usize {
    log.commands()
        .iter()
        .filter(|command| matches!(command, Command::BeginRenderPass { .. }))
        .count()
}

#[test]
pub fn shaded_frame_draws_scene_in_both_passes() -> Result<()> {
    let mesh = framework::TestMesh::triangle();
    let log = record_frame(CommandLog::new(), &framework::frame_commands(SceneMode::Shaded), &mesh)?;

    assert!(log.is_balanced());
    assert_eq!(count_begins(&log), 2);
    let passes = log.render_passes();
    assert_eq!(passes.len(), 2);
    for pass in &passes {
        let draws: Vec<_> = pass.iter().filter(|command| command.is_draw()).collect();
        assert_eq!(draws.len(), 1);
        assert!(matches!(draws[0], Command::DrawIndexed { index_count: 3, .. }));
    }
    // No full screen debug triangle anywhere.
    assert!(!log.commands().iter().any(|command| matches!(command, Command::Draw { .. })));
    Ok(())
}

#[test]
pub fn offscreen_pass_renders_before_scene_pass() -> Result<()> {
    let mesh = framework::TestMesh::triangle();
    let log = record_frame(CommandLog::new(), &framework::frame_commands(SceneMode::Shaded), &mesh)?;
    let passes = log.render_passes();

    assert!(binds_pipeline(passes[0], handles::OFFSCREEN_PIPELINE));
    assert!(binds_pipeline(passes[1], handles::SCENE_PIPELINE));
    match log.commands().first() {
        Some(Command::BeginRenderPass {
            extent,
            ..
        }) => assert_eq!(extent.width, 1024),
        other => panic!("expected the offscreen pass to begin first, got {other:?}"),
    }
    Ok(())
}

#[test]
pub fn debug_frame_draws_full_screen_triangle() -> Result<()> {
    let mesh = framework::TestMesh::triangle();
    let log = record_frame(CommandLog::new(), &framework::frame_commands(SceneMode::ShadowMapDebug), &mesh)?;
    let passes = log.render_passes();
    assert_eq!(passes.len(), 2);

    let scene = passes[1];
    assert!(binds_pipeline(scene, handles::DEBUG_PIPELINE));
    assert!(scene.iter().any(|command| matches!(
        command,
        Command::BindDescriptorSet { index: 0, set, .. } if *set == vk::DescriptorSet::from_raw(handles::DEBUG_SET)
    )));
    let draws: Vec<_> = scene.iter().filter(|command| command.is_draw()).collect();
    assert_eq!(draws.len(), 1);
    assert!(matches!(
        draws[0],
        Command::Draw {
            vertex_count: 3,
            instance_count: 1,
            ..
        }
    ));
    assert!(!scene.iter().any(|command| matches!(command, Command::DrawIndexed { .. })));
    // The shadow map is still rendered.
    assert_eq!(passes[0].iter().filter(|command| command.is_draw()).count(), 1);
    Ok(())
}
