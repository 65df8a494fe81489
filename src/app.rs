//! Application shell: page navigation, the canvas view, and the bridge
//! between the UI thread and background chain/storage workers.
//!
//! Workers are plain threads that build a current-thread tokio runtime,
//! block on the async pipeline, and report back over an mpsc channel the
//! update loop drains every frame. `ctx.request_repaint()` after each send
//! wakes the UI even when the user is idle.

use std::collections::HashMap;
use std::sync::mpsc;
use std::sync::Arc;

use eframe::egui;
use ethers::types::Address;

use crate::canvas::{CanvasState, SURFACE_HEIGHT, SURFACE_WIDTH};
use crate::chain::contract::{NftGateway, SessionMinter};
use crate::chain::error::ChainError;
use crate::chain::factory::{deploy_token, FactoryGateway};
use crate::chain::wallet::WalletSession;
use crate::collection::{load_collection, HttpFetcher, NftRecord};
use crate::components::connect_dialog::ConnectDialog;
use crate::components::gallery;
use crate::components::mint_dialog::MintDialog;
use crate::components::toasts::Toasts;
use crate::components::token_form::TokenForm;
use crate::components::toolbar::{self, ToolbarAction};
use crate::config::AppConfig;
use crate::storage::token_log::{DeployedTokenRecord, FileTokenLog, TokenLog};
use crate::storage::upload::StorageClient;
use crate::theme::Theme;
use crate::workflow::{run_mint, MintInput, MintOutcome, MintPhase, WalletView};
use crate::{log_err, log_info, log_warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Page {
    Home,
    Canvas,
    CreateToken,
    Collection,
}

/// Results flowing back from worker threads.
enum ChainEvent {
    WalletConnected(Box<Result<WalletSession, ChainError>>),
    MintPhase(MintPhase),
    MintFinished(Result<MintOutcome, ChainError>),
    TokenDeployed(Result<Address, ChainError>),
    CollectionLoaded(Result<Vec<NftRecord>, ChainError>),
    NftImageLoaded {
        token_id: u64,
        image: egui::ColorImage,
    },
}

#[derive(Default)]
struct CollectionState {
    loading: bool,
    records: Vec<NftRecord>,
    images: HashMap<u64, egui::TextureHandle>,
    /// Account the current records belong to; cleared to force a reload.
    loaded_for: Option<Address>,
}

pub struct InkmintApp {
    page: Page,
    theme: Theme,
    config: AppConfig,

    canvas: CanvasState,
    canvas_texture: Option<egui::TextureHandle>,

    wallet: Option<Arc<WalletSession>>,
    connecting: bool,
    mint_phase: MintPhase,
    deploying: bool,
    deployed_tokens: Vec<DeployedTokenRecord>,
    collection: CollectionState,

    mint_dialog: MintDialog,
    connect_dialog: ConnectDialog,
    token_form: TokenForm,
    toasts: Toasts,

    event_sender: mpsc::Sender<ChainEvent>,
    event_receiver: mpsc::Receiver<ChainEvent>,
}

impl InkmintApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);
        let (event_sender, event_receiver) = mpsc::channel();
        let deployed_tokens = FileTokenLog::open(FileTokenLog::default_path()).records();
        let connect_dialog = ConnectDialog::new(&config.rpc_url);

        Self {
            page: Page::Home,
            theme,
            config,
            canvas: CanvasState::new(),
            canvas_texture: None,
            wallet: None,
            connecting: false,
            mint_phase: MintPhase::Idle,
            deploying: false,
            deployed_tokens,
            collection: CollectionState::default(),
            mint_dialog: MintDialog::default(),
            connect_dialog,
            token_form: TokenForm::default(),
            toasts: Toasts::default(),
            event_sender,
            event_receiver,
        }
    }

    // -- event pump ------------------------------------------------------

    fn pump_events(&mut self, ctx: &egui::Context) {
        while let Ok(event) = self.event_receiver.try_recv() {
            match event {
                ChainEvent::WalletConnected(result) => self.on_wallet_connected(*result),
                ChainEvent::MintPhase(phase) => self.mint_phase = phase,
                ChainEvent::MintFinished(result) => self.on_mint_finished(result),
                ChainEvent::TokenDeployed(result) => self.on_token_deployed(result),
                ChainEvent::CollectionLoaded(result) => self.on_collection_loaded(result),
                ChainEvent::NftImageLoaded { token_id, image } => {
                    let texture = ctx.load_texture(
                        format!("nft-{}", token_id),
                        image,
                        egui::TextureOptions::LINEAR,
                    );
                    self.collection.images.insert(token_id, texture);
                }
            }
        }
    }

    fn on_wallet_connected(&mut self, result: Result<WalletSession, ChainError>) {
        self.connecting = false;
        match result {
            Ok(session) => {
                log_info!(
                    "Wallet connected: {} on chain {}",
                    session.account_short(),
                    session.chain_id()
                );
                self.toasts
                    .success("Wallet connected", Some(session.account_short()));
                if session.chain_id() != self.config.required_chain_id {
                    self.toasts.warning(format!(
                        "Connected to chain {}; minting requires chain {}",
                        session.chain_id(),
                        self.config.required_chain_id
                    ));
                }
                self.token_form
                    .suggest_recipient(&format!("{:#x}", session.account()));
                self.wallet = Some(Arc::new(session));
                // Whatever was loaded belonged to the previous account.
                self.collection.loaded_for = None;
            }
            Err(e) => {
                log_err!("Wallet connection failed: {}", e);
                self.toasts.error("Connection failed", Some(e.to_string()));
            }
        }
    }

    fn on_mint_finished(&mut self, result: Result<MintOutcome, ChainError>) {
        self.mint_phase = MintPhase::Idle;
        match result {
            Ok(outcome) => {
                let detail = match outcome.token_id {
                    Some(id) => format!("Token #{} — {}", id, outcome.artifact.metadata_uri),
                    None => outcome.artifact.metadata_uri.clone(),
                };
                log_info!("Mint confirmed: {}", detail);
                self.toasts.success("NFT minted!", Some(detail));
                self.collection.loaded_for = None;
            }
            Err(e) => {
                log_err!("Mint failed: {}", e);
                self.toasts.error("Mint failed", Some(e.to_string()));
            }
        }
    }

    fn on_token_deployed(&mut self, result: Result<Address, ChainError>) {
        self.deploying = false;
        match result {
            Ok(address) => {
                self.deployed_tokens =
                    FileTokenLog::open(FileTokenLog::default_path()).records();
                self.token_form.reset();
                self.toasts
                    .success("Token deployed", Some(format!("{:#x}", address)));
            }
            Err(e) => {
                log_err!("Token deployment failed: {}", e);
                self.toasts.error("Deployment failed", Some(e.to_string()));
            }
        }
    }

    fn on_collection_loaded(&mut self, result: Result<Vec<NftRecord>, ChainError>) {
        self.collection.loading = false;
        match result {
            Ok(records) => {
                log_info!("Collection loaded: {} NFT(s)", records.len());
                self.collection.records = records;
            }
            Err(e) => {
                log_err!("Collection load failed: {}", e);
                self.collection.records.clear();
                self.collection.loaded_for = None;
                self.toasts
                    .error("Could not load collection", Some(e.to_string()));
            }
        }
    }

    // -- workers ---------------------------------------------------------

    fn start_connect(&mut self, ctx: &egui::Context, rpc_url: String, private_key: String) {
        self.connecting = true;
        let sender = self.event_sender.clone();
        spawn_worker(ctx, move || async move {
            let result = WalletSession::connect(&rpc_url, &private_key).await;
            let _ = sender.send(ChainEvent::WalletConnected(Box::new(result)));
        });
    }

    fn start_mint(&mut self, ctx: &egui::Context, name: String, description: String) {
        let image_png = match self.canvas.export_png() {
            Ok(bytes) => bytes,
            Err(e) => {
                self.toasts.error("Could not export canvas", Some(e));
                return;
            }
        };
        if self.config.storage_api_key.is_empty() {
            self.toasts.error(
                "Storage API key is not configured",
                Some("Set LIGHTHOUSE_API_KEY or pass --storage-key".to_string()),
            );
            return;
        }
        let contract: Address = match self.config.contract_address.parse() {
            Ok(address) => address,
            Err(_) => {
                self.toasts.error(
                    "Invalid contract address",
                    Some(self.config.contract_address.clone()),
                );
                return;
            }
        };

        self.mint_phase = MintPhase::AwaitingWalletCheck;
        let wallet_view = WalletView {
            account: self.wallet.as_ref().map(|w| w.account()),
            chain_id: self.wallet.as_ref().map(|w| w.chain_id_hex()),
        };
        let required_chain = self.config.required_chain_id;
        let store = StorageClient::new(
            self.config.storage_api_url.clone(),
            self.config.storage_api_key.clone(),
            self.config.storage_gateway.clone(),
        );
        let minter = SessionMinter::new(self.wallet.clone(), contract);
        let sender = self.event_sender.clone();
        let repaint = ctx.clone();

        spawn_worker(ctx, move || async move {
            let phase_sender = sender.clone();
            let result = run_mint(
                &wallet_view,
                required_chain,
                &store,
                &minter,
                MintInput {
                    image_png,
                    name,
                    description,
                },
                |phase| {
                    let _ = phase_sender.send(ChainEvent::MintPhase(phase));
                    repaint.request_repaint();
                },
            )
            .await;
            let _ = sender.send(ChainEvent::MintFinished(result));
        });
    }

    fn start_deploy(
        &mut self,
        ctx: &egui::Context,
        request: crate::components::token_form::TokenDeployRequest,
    ) {
        let Some(wallet) = self.wallet.clone() else {
            self.toasts.warning("Connect your wallet first");
            return;
        };
        if self.config.factory_address.is_empty() {
            self.toasts.error(
                "Token factory is not configured",
                Some("Set TOKEN_FACTORY_ADDRESS or pass --factory".to_string()),
            );
            return;
        }
        let factory: Address = match self.config.factory_address.parse() {
            Ok(address) => address,
            Err(_) => {
                self.toasts.error(
                    "Invalid factory address",
                    Some(self.config.factory_address.clone()),
                );
                return;
            }
        };

        self.deploying = true;
        let sender = self.event_sender.clone();
        spawn_worker(ctx, move || async move {
            let gateway = FactoryGateway::new(&wallet, factory);
            let mut log = FileTokenLog::open(FileTokenLog::default_path());
            let result = deploy_token(
                &gateway,
                &mut log,
                &request.name,
                &request.symbol,
                &request.supply,
                &request.recipient,
            )
            .await;
            let _ = sender.send(ChainEvent::TokenDeployed(result));
        });
    }

    fn start_collection_load(&mut self, ctx: &egui::Context) {
        let Some(wallet) = self.wallet.clone() else {
            return;
        };
        self.collection.loading = true;
        self.collection.loaded_for = Some(wallet.account());
        self.collection.records.clear();
        self.collection.images.clear();

        let contract_address = self.config.contract_address.clone();
        let sender = self.event_sender.clone();
        let repaint = ctx.clone();

        spawn_worker(ctx, move || async move {
            let loaded = async {
                let contract: Address = contract_address
                    .parse()
                    .map_err(|_| ChainError::InvalidAddress(contract_address.clone()))?;
                let gateway = NftGateway::connect(&wallet, contract).await?;
                let fetcher = HttpFetcher::default();
                let records =
                    load_collection(&gateway, &fetcher, wallet.account(), &contract_address)
                        .await?;
                Ok::<_, ChainError>((records, fetcher))
            }
            .await;

            match loaded {
                Ok((records, fetcher)) => {
                    let _ = sender.send(ChainEvent::CollectionLoaded(Ok(records.clone())));
                    repaint.request_repaint();
                    // Images trickle in after the records so the grid renders
                    // immediately with placeholders.
                    for record in records {
                        if !record.image_url.starts_with("http") {
                            continue;
                        }
                        let bytes = match fetcher.fetch_bytes(&record.image_url).await {
                            Ok(bytes) => bytes,
                            Err(e) => {
                                log_warn!(
                                    "Could not fetch image for token {}: {}",
                                    record.token_id,
                                    e
                                );
                                continue;
                            }
                        };
                        match image::load_from_memory(&bytes) {
                            Ok(decoded) => {
                                let rgba = decoded.into_rgba8();
                                let image = egui::ColorImage::from_rgba_unmultiplied(
                                    [rgba.width() as usize, rgba.height() as usize],
                                    rgba.as_raw(),
                                );
                                let _ = sender.send(ChainEvent::NftImageLoaded {
                                    token_id: record.token_id,
                                    image,
                                });
                                repaint.request_repaint();
                            }
                            Err(e) => {
                                log_warn!(
                                    "Could not decode image for token {}: {}",
                                    record.token_id,
                                    e
                                );
                            }
                        }
                    }
                }
                Err(e) => {
                    let _ = sender.send(ChainEvent::CollectionLoaded(Err(e)));
                }
            }
        });
    }

    // -- pages -----------------------------------------------------------

    fn nav_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("nav").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.heading(
                    egui::RichText::new("InkMint")
                        .color(self.theme.accent)
                        .strong(),
                );
                ui.separator();
                for (page, label) in [
                    (Page::Home, "Home"),
                    (Page::Canvas, "Canvas"),
                    (Page::CreateToken, "Create Token"),
                    (Page::Collection, "My NFTs"),
                ] {
                    if ui.selectable_label(self.page == page, label).clicked() {
                        self.page = page;
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    let theme_icon = match self.theme.mode {
                        crate::theme::ThemeMode::Dark => "☀",
                        crate::theme::ThemeMode::Light => "🌙",
                    };
                    if ui.button(theme_icon).clicked() {
                        self.theme = self.theme.toggled();
                        self.theme.apply(ctx);
                    }

                    match &self.wallet {
                        Some(session) => {
                            let account_short = session.account_short();
                            if ui.button("Disconnect").clicked() {
                                self.wallet = None;
                                self.collection = CollectionState::default();
                                self.toasts.info("Wallet disconnected");
                            }
                            ui.label(
                                egui::RichText::new(account_short)
                                    .color(self.theme.success()),
                            );
                        }
                        None => {
                            if self.connecting {
                                ui.spinner();
                                ui.label("Connecting…");
                            } else if ui.button("Connect Wallet").clicked() {
                                self.connect_dialog.open();
                            }
                        }
                    }
                });
            });
        });
    }

    fn home_page(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(60.0);
            ui.heading(
                egui::RichText::new("Draw it. Mint it. Own it.")
                    .size(32.0)
                    .strong(),
            );
            ui.add_space(8.0);
            ui.label(
                egui::RichText::new(
                    "Paint on the canvas, publish your artwork to IPFS, and mint it \
                     as an NFT on Base — all from your desktop.",
                )
                .color(self.theme.muted_text()),
            );
            ui.add_space(24.0);
            ui.horizontal(|ui| {
                ui.add_space(ui.available_width() / 2.0 - 160.0);
                if ui.button("🎨 Start drawing").clicked() {
                    self.page = Page::Canvas;
                }
                if ui.button("🪙 Create a token").clicked() {
                    self.page = Page::CreateToken;
                }
                if ui.button("🖼 View collection").clicked() {
                    self.page = Page::Collection;
                }
            });
        });
    }

    fn canvas_page(&mut self, ui: &mut egui::Ui) {
        if let Some(ToolbarAction::MintRequested) =
            toolbar::show(ui, &mut self.canvas, &mut self.toasts, self.mint_phase)
        {
            self.mint_dialog.open();
        }
        ui.separator();

        // Undo/redo shortcuts work anywhere on the canvas page.
        let (undo, redo) = ui.input(|i| {
            let z = i.key_pressed(egui::Key::Z);
            let y = i.key_pressed(egui::Key::Y);
            (
                i.modifiers.command && z && !i.modifiers.shift,
                i.modifiers.command && (y || (z && i.modifiers.shift)),
            )
        });
        if undo {
            self.canvas.undo();
        }
        if redo {
            self.canvas.redo();
        }

        ui.vertical_centered(|ui| {
            self.canvas_view(ui);
        });
    }

    fn canvas_view(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_size();
        let scale = (available.x / SURFACE_WIDTH as f32)
            .min(available.y / SURFACE_HEIGHT as f32)
            .clamp(0.2, 1.0);
        let display = egui::vec2(SURFACE_WIDTH as f32 * scale, SURFACE_HEIGHT as f32 * scale);
        let (response, painter) = ui.allocate_painter(display, egui::Sense::drag());

        if self.canvas.take_dirty() {
            let image = egui::ColorImage::from_rgba_unmultiplied(
                [self.canvas.width() as usize, self.canvas.height() as usize],
                self.canvas.surface().as_raw(),
            );
            match &mut self.canvas_texture {
                Some(texture) => texture.set(image, egui::TextureOptions::LINEAR),
                None => {
                    self.canvas_texture = Some(ui.ctx().load_texture(
                        "canvas",
                        image,
                        egui::TextureOptions::LINEAR,
                    ));
                }
            }
        }
        if let Some(texture) = &self.canvas_texture {
            painter.image(
                texture.id(),
                response.rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                egui::Color32::WHITE,
            );
        }
        painter.rect_stroke(
            response.rect,
            0.0,
            egui::Stroke::new(1.0, ui.visuals().window_stroke.color),
        );

        let to_surface = |pos: egui::Pos2| {
            let rel = (pos - response.rect.min) / scale;
            (
                rel.x.clamp(0.0, (SURFACE_WIDTH - 1) as f32),
                rel.y.clamp(0.0, (SURFACE_HEIGHT - 1) as f32),
            )
        };
        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.canvas.begin_stroke(to_surface(pos));
            }
        } else if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.canvas.extend_stroke(to_surface(pos));
            }
        }
        if response.drag_released() {
            self.canvas.end_stroke();
        }
    }

    fn create_token_page(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let request = self.token_form.show(
            ui,
            &self.theme,
            &self.config,
            &self.deployed_tokens,
            self.deploying,
        );
        if let Some(request) = request {
            self.start_deploy(ctx, request);
        }
    }

    fn collection_page(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) {
        let Some(wallet) = &self.wallet else {
            ui.vertical_centered(|ui| {
                ui.add_space(40.0);
                ui.heading("Connect your wallet");
                ui.label(
                    egui::RichText::new("Your NFTs will appear here once connected.")
                        .color(self.theme.muted_text()),
                );
                ui.add_space(8.0);
                if ui.button("Connect Wallet").clicked() {
                    self.connect_dialog.open();
                }
            });
            return;
        };

        let account = wallet.account();
        let stale = self.collection.loaded_for != Some(account);
        if stale && !self.collection.loading {
            self.start_collection_load(ctx);
        }

        ui.horizontal(|ui| {
            ui.heading("My NFTs");
            if !self.collection.loading && ui.button("⟳ Refresh").clicked() {
                self.collection.loaded_for = None;
            }
        });
        ui.add_space(8.0);
        gallery::show(
            ui,
            &self.theme,
            &self.config,
            &self.collection.records,
            &self.collection.images,
            self.collection.loading,
        );
    }
}

impl eframe::App for InkmintApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.pump_events(ctx);
        self.nav_bar(ctx);

        egui::CentralPanel::default().show(ctx, |ui| match self.page {
            Page::Home => self.home_page(ui),
            Page::Canvas => self.canvas_page(ui),
            Page::CreateToken => self.create_token_page(ctx, ui),
            Page::Collection => self.collection_page(ctx, ui),
        });

        if let Some(request) = self.connect_dialog.show(ctx, self.connecting) {
            self.start_connect(ctx, request.rpc_url, request.private_key);
        }
        if let Some(request) = self.mint_dialog.show(ctx) {
            self.start_mint(ctx, request.name, request.description);
        }

        self.toasts.show(ctx, &self.theme);
    }
}

/// Run an async job on its own thread with a current-thread runtime, then
/// wake the UI. The job owns everything it needs; results come back over
/// the event channel.
fn spawn_worker<F, Fut>(ctx: &egui::Context, job: F)
where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()>,
{
    let ctx = ctx.clone();
    std::thread::spawn(move || {
        match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime.block_on(job()),
            Err(e) => log_err!("Could not start worker runtime: {}", e),
        }
        ctx.request_repaint();
    });
}
