use bevy::prelude::*;
use bevy::log::LogPlugin;

use bevy_globe::config::{RunConfig, SceneKind, LOG_FILTER, WINDOW_TITLE};
use bevy_globe::systems::camera::OrbitCamPlugin;
use bevy_globe::systems::driver::DriverPlugin;
use bevy_globe::systems::globe::GlobePlugin;
use bevy_globe::systems::icosahedron::IcosahedronPlugin;

fn main() -> AppExit {
    // bad overrides fail before any window opens
    let run = match RunConfig::from_env() {
        Ok(run) => run,
        Err(err) => {
            eprintln!("bevy_globe: {err}");
            return AppExit::error();
        }
    };

    let mut app = App::new();
    app.add_plugins(
        DefaultPlugins
            .set(LogPlugin {
                filter: LOG_FILTER.to_string(),
                ..default()
            })
            .set(WindowPlugin {
                primary_window: Some(Window {
                    title: WINDOW_TITLE.to_string(),
                    ..default()
                }),
                ..default()
            }),
    )
    .add_plugins(OrbitCamPlugin)
    .add_plugins(DriverPlugin {
        frame_limit: run.frame_limit,
    })
    .insert_resource(ClearColor(Color::srgb(0.0, 0.0, 0.0)));

    match run.scene {
        SceneKind::Globe => app.add_plugins(GlobePlugin),
        SceneKind::Icosahedron => app.add_plugins(IcosahedronPlugin),
    };

    app.run()
}
