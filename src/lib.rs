pub mod haptics;
pub mod patterns;
pub mod playback;
pub mod settings;
pub mod utils;

pub use haptics::{HapticPrimitive, UnavailableHaptic, STOP_SEQUENCE};
pub use patterns::{Catalog, Pattern, PatternKind};
pub use playback::{PlaybackController, PlaybackSnapshot};
pub use settings::PlaybackSettings;

#[cfg(feature = "desktop")]
pub use desktop::run;

#[cfg(feature = "desktop")]
pub(crate) use desktop::AppState;

#[cfg(feature = "desktop")]
mod desktop {
    use tauri::{Manager, RunEvent};

    use crate::{
        patterns::Catalog,
        playback::{
            commands::{
                get_playback_state, list_patterns, probe_haptics, select_pattern, toggle_playback,
            },
            ControllerSlot,
        },
        settings::PlaybackSettings,
        utils::init_logging,
    };

    pub struct AppState {
        pub(crate) settings: PlaybackSettings,
        pub(crate) catalog: Catalog,
        /// Created by the page's one-time `probe_haptics` call.
        pub(crate) playback: ControllerSlot,
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        init_logging();

        log::info!("VibeCheck starting up...");

        tauri::Builder::default()
            .setup(|app| {
                let result = (|| -> anyhow::Result<()> {
                    let app_config_dir = app
                        .path()
                        .app_config_dir()
                        .map_err(|err| anyhow::anyhow!(err))?;

                    let settings =
                        PlaybackSettings::from_env(&app_config_dir.join("settings.json"))?;
                    let catalog = settings.catalog()?;

                    app.manage(AppState {
                        settings,
                        catalog,
                        playback: ControllerSlot::new(),
                    });

                    Ok(())
                })();

                result.map_err(|err| err.into())
            })
            .invoke_handler(tauri::generate_handler![
                probe_haptics,
                list_patterns,
                get_playback_state,
                select_pattern,
                toggle_playback,
            ])
            .build(tauri::generate_context!())
            .expect("error while building tauri application")
            .run(|app_handle, event| {
                if let RunEvent::Exit = event {
                    if let Some(controller) = app_handle
                        .try_state::<AppState>()
                        .and_then(|state| state.playback.get().cloned())
                    {
                        controller.teardown();
                    }
                }
            });
    }
}
