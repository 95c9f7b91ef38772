use super::*;

pub struct App {
    pub config: Config,
    pub config_path: PathBuf,
    pub config_report: ConfigReport,
    pub verification: VerificationController,
    pub client: EudiploClient,
    pub qr_options: QrOptions,
    pub view: ShopView,
    pub layout: LayoutState,
    pub keybinds: Keybinds,
    pub setup: Option<SetupForm>,
    pub show_help: bool,
    pub app_async_tx: Option<mpsc::UnboundedSender<AppAsyncEvent>>,
    pub app_async_rx: Option<mpsc::UnboundedReceiver<AppAsyncEvent>>,
    pub last_error: Option<String>,
}

impl Default for App {
    fn default() -> Self {
        Self::new(Config::default(), default_config_path())
    }
}

impl App {
    pub fn new(config: Config, config_path: PathBuf) -> Self {
        let (app_async_tx, app_async_rx) = mpsc::unbounded_channel();
        let config_report = config.validate();

        Self {
            config,
            config_path,
            config_report,
            verification: VerificationController::new(),
            client: EudiploClient::new(),
            qr_options: QrOptions::default(),
            view: ShopView::Catalog,
            layout: LayoutState::default(),
            keybinds: Keybinds,
            setup: None,
            show_help: false,
            app_async_tx: Some(app_async_tx),
            app_async_rx: Some(app_async_rx),
            last_error: None,
        }
    }
}
