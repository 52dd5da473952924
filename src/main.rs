use solids::EditorApp;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = solids::default()?;
    log::info!("Starting editor with {} objects", app.scene().objects().len());
    EditorApp::run(app)
}
