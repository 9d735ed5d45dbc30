use crate::config::AppConfig;
use crate::logging::{LogEntry, LogLevel};
use crate::logic::api::ApiClient;
use crate::logic::backup;
use crate::logic::catalog;
use crate::logic::fontstore::{self, CustomFontRecord, FontStore};
use crate::logic::models::{
    BackupInfo, DiscordStatus, ServerSettings, WEEKDAY_LABELS, validate_notify_time,
};
use crate::message::{AppMsg, GLOBAL_SENDER, send_msg};
use crate::ui::fonts::{FontChoice, apply_ui_font};
use crate::utils::{format_bytes, has_extension};
use crate::{log_err, log_info, log_success, log_warn};
use crossbeam_channel::Receiver;
use eframe::egui;
use std::thread;
use tokio_util::sync::CancellationToken;

/// 备份列表里每行按钮产生的动作，收集后在 UI 闭包外统一处理。
enum BackupRowAction {
    Download(String),
    AskRestore(String),
    Delete(String),
}

enum FontRowAction {
    CopyCss(String),
    Delete(String),
}

pub struct SettingsApp {
    config: AppConfig,
    settings: Option<ServerSettings>,
    backups: Vec<BackupInfo>,
    discord: Option<DiscordStatus>,
    discord_invite: Option<String>,
    custom_fonts: Vec<CustomFontRecord>,
    font_choice: FontChoice,
    pending_font_size: u32,
    pending_line_height: f32,
    logs: Vec<LogEntry>,
    msg_receiver: Receiver<AppMsg>,
    is_processing: bool,
    cancellation_token: Option<CancellationToken>,
    confirm_restore: Option<String>,
    fonts_dirty: bool,
}

impl SettingsApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        let _ = GLOBAL_SENDER.set(sender);

        let config = AppConfig::load(); // 加载保存的配置
        let font_choice = FontChoice::from_config(&config.ui_font);

        if config.theme == "light" {
            cc.egui_ctx.set_visuals(egui::Visuals::light());
        } else {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
        }
        cc.egui_ctx.set_zoom_factor(1.1);

        let mut app = Self {
            config,
            settings: None,
            backups: Vec::new(),
            discord: None,
            discord_invite: None,
            custom_fonts: Vec::new(),
            font_choice,
            pending_font_size: 16,
            pending_line_height: 1.5,
            logs: Vec::new(),
            msg_receiver: receiver,
            is_processing: false,
            cancellation_token: None,
            confirm_restore: None,
            fonts_dirty: false,
        };

        // 本地字体仓库不依赖服务器，启动即读
        app.reload_fonts();
        app
    }

    /// 后台线程 + 单线程 runtime 跑一个异步任务，结果经全局通道回传。
    fn run_async<F, Fut>(&mut self, job: F)
    where
        F: FnOnce(ApiClient, CancellationToken) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()>,
    {
        if self.is_processing {
            return;
        }
        self.is_processing = true;
        // 保存当前配置
        self.config.save();

        let client = ApiClient::new(self.config.clone());
        let token = CancellationToken::new();
        self.cancellation_token = Some(token.clone());

        thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();
            rt.block_on(async move {
                job(client, token).await;
                send_msg(AppMsg::TaskFinished);
            });
        });
    }

    fn cancel_processing(&mut self) {
        if let Some(token) = &self.cancellation_token {
            token.cancel();
            self.logs
                .push(LogEntry::new(LogLevel::Warn, "任务已被用户取消"));
        }
        self.is_processing = false;
        self.cancellation_token = None;
    }

    fn refresh_all(&mut self) {
        let store_root = FontStore::default_dir();
        self.run_async(move |client, token| async move {
            log_info!("正在连接服务器，拉取设置...");
            match client.fetch_settings(&token).await {
                Ok(s) => {
                    log_success!("✅ 连接成功，设置已加载");
                    send_msg(AppMsg::SettingsFetched(s));
                }
                Err(e) => log_err!("❌ 拉取设置失败: {}", e),
            }
            match client.fetch_backups(&token).await {
                Ok(b) => send_msg(AppMsg::BackupsFetched(b)),
                Err(e) => log_err!("拉取备份列表失败: {}", e),
            }
            match client.discord_status(&token).await {
                Ok(d) => send_msg(AppMsg::DiscordFetched(d)),
                Err(e) => log_warn!("获取 Discord 状态失败: {}", e),
            }
            let store = FontStore::new(store_root);
            match store.list().await {
                Ok(fonts) => send_msg(AppMsg::FontsReloaded(fonts)),
                Err(e) => log_err!("读取本地字体仓库失败: {}", e),
            }
        });
    }

    fn reload_fonts(&mut self) {
        let store_root = FontStore::default_dir();
        self.run_async(move |_client, _token| async move {
            let store = FontStore::new(store_root);
            match store.list().await {
                Ok(fonts) => send_msg(AppMsg::FontsReloaded(fonts)),
                Err(e) => log_err!("读取本地字体仓库失败: {}", e),
            }
        });
    }

    fn save_settings(&mut self) {
        let Some(settings) = self.settings.clone() else {
            return;
        };
        if !validate_notify_time(&settings.notify_time) {
            self.logs.push(LogEntry::new(
                LogLevel::Error,
                "提醒时间格式应为 HH:MM，例如 18:30",
            ));
            return;
        }
        self.run_async(move |client, token| async move {
            match client.update_settings(&settings, &token).await {
                Ok(_) => log_success!("✅ 设置已保存到服务器"),
                Err(e) => log_err!("❌ 保存设置失败: {}", e),
            }
        });
    }

    fn create_backup(&mut self) {
        self.run_async(move |client, token| async move {
            log_info!("正在创建数据库备份...");
            match client.create_backup(&token).await {
                Ok(_) => log_success!("✅ 备份创建完成"),
                Err(e) => {
                    log_err!("❌ 创建备份失败: {}", e);
                    return;
                }
            }
            match client.fetch_backups(&token).await {
                Ok(b) => send_msg(AppMsg::BackupsFetched(b)),
                Err(e) => log_warn!("刷新备份列表失败: {}", e),
            }
        });
    }

    fn download_backup(&mut self, name: String) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&name)
            .add_filter("Zip 备份", &["zip"])
            .save_file()
        else {
            return;
        };
        self.run_async(move |client, token| async move {
            log_info!("正在下载备份 {} ...", name);
            match client.download_backup(&name, &token).await {
                Ok(bytes) => {
                    let size = bytes.len() as u64;
                    match backup::write_download(&path, &bytes) {
                        Ok(_) => {
                            log_success!("✅ 备份已保存到 {:?} ({})", path, format_bytes(size))
                        }
                        Err(e) => log_err!("写入备份文件失败: {}", e),
                    }
                }
                Err(e) => log_err!("❌ 下载备份失败: {}", e),
            }
        });
    }

    fn upload_backup(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Zip 备份", &["zip"])
            .pick_file()
        else {
            return;
        };
        if !has_extension(&path, "zip") {
            self.logs.push(LogEntry::new(
                LogLevel::Error,
                "备份上传只接受 .zip 文件",
            ));
            return;
        }
        // 先在本地把包打开一遍，坏包不浪费上传流量
        match backup::inspect_archive(&path) {
            Ok(count) => self.logs.push(LogEntry::new(
                LogLevel::Info,
                format!("备份包检查通过，共 {} 个条目", count),
            )),
            Err(e) => {
                self.logs
                    .push(LogEntry::new(LogLevel::Error, format!("备份包检查失败: {}", e)));
                return;
            }
        }
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                self.logs
                    .push(LogEntry::new(LogLevel::Error, format!("读取备份文件失败: {}", e)));
                return;
            }
        };
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        self.run_async(move |client, token| async move {
            log_info!("正在上传备份 {} ...", file_name);
            match client.upload_backup(&file_name, bytes, &token).await {
                Ok(_) => log_success!("✅ 备份上传完成"),
                Err(e) => {
                    log_err!("❌ 上传备份失败: {}", e);
                    return;
                }
            }
            match client.fetch_backups(&token).await {
                Ok(b) => send_msg(AppMsg::BackupsFetched(b)),
                Err(e) => log_warn!("刷新备份列表失败: {}", e),
            }
        });
    }

    fn restore_backup(&mut self, name: String) {
        self.run_async(move |client, token| async move {
            log_warn!("开始恢复备份 [{}]，期间服务可能短暂不可用", name);
            match client.restore_backup(&name, &token).await {
                Ok(_) => log_success!("✅ 恢复完成，服务端已切换到备份数据"),
                Err(e) => log_err!("❌ 恢复失败: {}", e),
            }
        });
    }

    fn delete_backup(&mut self, name: String) {
        self.run_async(move |client, token| async move {
            match client.delete_backup(&name, &token).await {
                Ok(_) => log_success!("✅ 备份 [{}] 已删除", name),
                Err(e) => {
                    log_err!("❌ 删除备份失败: {}", e);
                    return;
                }
            }
            match client.fetch_backups(&token).await {
                Ok(b) => send_msg(AppMsg::BackupsFetched(b)),
                Err(e) => log_warn!("刷新备份列表失败: {}", e),
            }
        });
    }

    fn export_recipes(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name("recipes_export.json")
            .add_filter("JSON 文档", &["json"])
            .save_file()
        else {
            return;
        };
        self.run_async(move |client, token| async move {
            log_info!("正在导出全部食谱...");
            match client.export_recipes(&token).await {
                Ok(bytes) => {
                    let size = bytes.len() as u64;
                    match std::fs::write(&path, &bytes) {
                        Ok(_) => log_success!("✅ 已导出到 {:?} ({})", path, format_bytes(size)),
                        Err(e) => log_err!("写入导出文件失败: {}", e),
                    }
                }
                Err(e) => log_err!("❌ 导出失败: {}", e),
            }
        });
    }

    fn import_recipes(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("JSON 文档", &["json"])
            .pick_file()
        else {
            return;
        };
        if !has_extension(&path, "json") {
            self.logs.push(LogEntry::new(
                LogLevel::Error,
                "食谱导入只接受 .json 文档",
            ));
            return;
        }
        let bytes = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                self.logs
                    .push(LogEntry::new(LogLevel::Error, format!("读取导入文件失败: {}", e)));
                return;
            }
        };
        if serde_json::from_slice::<serde_json::Value>(&bytes).is_err() {
            self.logs.push(LogEntry::new(
                LogLevel::Error,
                "文件内容不是有效的 JSON，已放弃导入",
            ));
            return;
        }

        self.run_async(move |client, token| async move {
            log_info!("正在导入食谱...");
            match client.import_recipes(bytes, &token).await {
                Ok(n) => log_success!("✅ 导入完成，共 {} 条食谱", n),
                Err(e) => log_err!("❌ 导入失败: {}", e),
            }
        });
    }

    fn discord_reconnect(&mut self) {
        self.run_async(move |client, token| async move {
            log_info!("正在重连 Discord 机器人...");
            match client.discord_reconnect(&token).await {
                Ok(_) => log_success!("✅ 重连指令已下发"),
                Err(e) => {
                    log_err!("❌ 重连失败: {}", e);
                    return;
                }
            }
            match client.discord_status(&token).await {
                Ok(d) => send_msg(AppMsg::DiscordFetched(d)),
                Err(e) => log_warn!("刷新 Discord 状态失败: {}", e),
            }
        });
    }

    fn discord_test(&mut self) {
        self.run_async(move |client, token| async move {
            match client.discord_test(&token).await {
                Ok(_) => log_success!("✅ 测试消息已发送，请在 Discord 频道确认"),
                Err(e) => log_err!("❌ 发送测试消息失败: {}", e),
            }
        });
    }

    fn discord_link(&mut self) {
        self.run_async(move |client, token| async move {
            match client.discord_link(&token).await {
                Ok(url) => send_msg(AppMsg::DiscordLink(url)),
                Err(e) => log_err!("❌ 获取邀请链接失败: {}", e),
            }
        });
    }

    fn upload_font(&mut self) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("WOFF2 字体", &["woff2"])
            .pick_file()
        else {
            return;
        };
        if !has_extension(&path, "woff2") {
            self.logs.push(LogEntry::new(
                LogLevel::Error,
                "自定义字体只接受 .woff2 文件",
            ));
            return;
        }
        let data = match std::fs::read(&path) {
            Ok(b) => b,
            Err(e) => {
                self.logs
                    .push(LogEntry::new(LogLevel::Error, format!("读取字体文件失败: {}", e)));
                return;
            }
        };
        let name = path
            .file_stem()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let record = CustomFontRecord::new(
            name,
            data,
            format!("{}px", self.pending_font_size),
            self.pending_line_height,
        );

        let store_root = FontStore::default_dir();
        self.run_async(move |_client, _token| async move {
            let store = FontStore::new(store_root);
            match store.save(&record).await {
                Ok(_) => log_success!("✅ 字体 [{}] 已入库", record.name),
                Err(e) => {
                    log_err!("❌ 字体入库失败: {}", e);
                    return;
                }
            }
            match store.list().await {
                Ok(fonts) => send_msg(AppMsg::FontsReloaded(fonts)),
                Err(e) => log_err!("刷新字体列表失败: {}", e),
            }
        });
    }

    fn delete_font(&mut self, name: String) {
        let store_root = FontStore::default_dir();
        self.run_async(move |_client, _token| async move {
            let store = FontStore::new(store_root);
            match store.delete(&name).await {
                Ok(true) => log_success!("✅ 字体 [{}] 已删除", name),
                Ok(false) => log_warn!("字体 [{}] 本来就不存在", name),
                Err(e) => {
                    log_err!("❌ 删除字体失败: {}", e);
                    return;
                }
            }
            match store.list().await {
                Ok(fonts) => send_msg(AppMsg::FontsReloaded(fonts)),
                Err(e) => log_err!("刷新字体列表失败: {}", e),
            }
        });
    }

    fn copy_font_css(&mut self, ctx: &egui::Context, name: &str) {
        if let Some(record) = self.custom_fonts.iter().find(|r| r.name == name) {
            ctx.copy_text(fontstore::to_font_face_rule(record));
            self.logs.push(LogEntry::new(
                LogLevel::Info,
                format!("字体 [{}] 的 @font-face 规则已复制到剪贴板", name),
            ));
        }
    }

    fn pump_messages(&mut self) {
        while let Ok(msg) = self.msg_receiver.try_recv() {
            match msg {
                AppMsg::Log(entry) => {
                    if self.logs.len() > 1000 {
                        self.logs.remove(0);
                    }
                    self.logs.push(entry);
                }
                AppMsg::SettingsFetched(s) => self.settings = Some(s),
                AppMsg::BackupsFetched(b) => self.backups = b,
                AppMsg::DiscordFetched(d) => self.discord = Some(d),
                AppMsg::DiscordLink(url) => {
                    self.logs
                        .push(LogEntry::new(LogLevel::Success, "已获取机器人邀请链接"));
                    self.discord_invite = Some(url);
                }
                AppMsg::FontsReloaded(fonts) => {
                    self.custom_fonts = fonts;
                    // 选中的自定义字体被删掉后退回目录默认值
                    if let FontChoice::Custom(name) = &self.font_choice {
                        if !self.custom_fonts.iter().any(|r| &r.name == name) {
                            self.font_choice =
                                FontChoice::Builtin(catalog::default_id().to_string());
                            self.config.ui_font = self.font_choice.to_config();
                            self.config.save();
                        }
                    }
                    self.fonts_dirty = true;
                }
                AppMsg::TaskFinished => {
                    self.is_processing = false;
                    self.cancellation_token = None;
                }
            }
        }
    }

    fn render_restore_confirm(&mut self, ctx: &egui::Context) {
        let Some(name) = self.confirm_restore.clone() else {
            return;
        };
        let mut decided: Option<bool> = None;

        egui::Window::new("⚠ 恢复备份确认")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!(
                    "确定用备份 [{}] 覆盖当前数据库吗？现有数据会被替换，建议先新建一个备份。",
                    name
                ));
                ui.add_space(10.0);
                ui.horizontal(|ui| {
                    if ui.button("♻ 确认恢复").clicked() {
                        decided = Some(true);
                    }
                    if ui.button("取消").clicked() {
                        decided = Some(false);
                    }
                });
            });

        match decided {
            Some(true) => {
                self.confirm_restore = None;
                self.restore_backup(name);
            }
            Some(false) => self.confirm_restore = None,
            None => {}
        }
    }
}

impl eframe::App for SettingsApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.render_restore_confirm(ctx);
        self.pump_messages();

        if self.fonts_dirty {
            apply_ui_font(ctx, &self.font_choice, &self.custom_fonts);
            self.fonts_dirty = false;
        }

        // 底部信息栏
        egui::TopBottomPanel::bottom("footer_panel").show(ctx, |ui| {
            ui.add_space(2.0);
            ui.horizontal(|ui| {
                ui.label(egui::RichText::new("v0.3.2").weak().size(10.0));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.hyperlink_to(
                        egui::RichText::new("GitHub 主页").size(11.0),
                        "https://github.com/recipe-settings/recipe_settings",
                    );
                });
            });
            ui.add_space(2.0); // 底部留白
        });

        let mut save_settings_clicked = false;
        let mut backup_action: Option<BackupRowAction> = None;
        let mut font_action: Option<FontRowAction> = None;
        let font_choice_before = self.font_choice.clone();
        let mut theme_changed = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Recipe Manager 设置面板");
            ui.separator();

            egui::ScrollArea::vertical()
                .id_salt("sections_area")
                .auto_shrink([false, true])
                .max_height((ui.available_height() - 160.0).max(120.0))
                .show(ui, |ui| {
                    // ---- 服务器连接 ----
                    egui::Grid::new("connection_grid")
                        .num_columns(2)
                        .spacing([10.0, 8.0])
                        .striped(true)
                        .show(ui, |ui| {
                            ui.label("服务器地址:");
                            ui.text_edit_singleline(&mut self.config.server_url);
                            ui.end_row();

                            ui.label("API TOKEN:");
                            ui.add(
                                egui::TextEdit::singleline(&mut self.config.api_token)
                                    .password(true),
                            );
                            ui.end_row();

                            ui.label("面板主题:");
                            ui.horizontal(|ui| {
                                egui::ComboBox::from_id_salt("panel_theme_select")
                                    .selected_text(&self.config.theme)
                                    .width(100.0)
                                    .show_ui(ui, |ui| {
                                        for theme in ["dark", "light"] {
                                            if ui
                                                .selectable_value(
                                                    &mut self.config.theme,
                                                    theme.to_string(),
                                                    theme,
                                                )
                                                .clicked()
                                            {
                                                theme_changed = true;
                                            }
                                        }
                                    });

                                if ui.button("🔄 连接 & 刷新").clicked() {
                                    if self.config.api_token.is_empty() {
                                        self.logs.push(LogEntry::new(
                                            LogLevel::Error,
                                            "请先填写 API Token",
                                        ));
                                    } else {
                                        self.refresh_all();
                                    }
                                }
                            });
                            ui.end_row();
                        });

                    ui.add_space(10.0);

                    // ---- 通知计划 ----
                    ui.label(egui::RichText::new("📅 通知计划").strong());
                    match self.settings.as_mut() {
                        Some(settings) => {
                            ui.horizontal(|ui| {
                                ui.checkbox(&mut settings.notifications_enabled, "启用每日提醒");
                                ui.separator();
                                ui.label("提醒时间:");
                                ui.add(
                                    egui::TextEdit::singleline(&mut settings.notify_time)
                                        .desired_width(60.0)
                                        .hint_text("18:30"),
                                );
                            });
                            ui.horizontal(|ui| {
                                for (i, label) in WEEKDAY_LABELS.iter().enumerate() {
                                    ui.checkbox(&mut settings.notify_days[i], *label);
                                }
                            });
                            ui.horizontal(|ui| {
                                ui.label("Webhook 地址:");
                                ui.text_edit_singleline(&mut settings.webhook_url);
                            });
                            ui.horizontal(|ui| {
                                ui.label("网页主题:");
                                egui::ComboBox::from_id_salt("web_theme_select")
                                    .selected_text(&settings.theme)
                                    .width(100.0)
                                    .show_ui(ui, |ui| {
                                        for theme in ["light", "dark"] {
                                            ui.selectable_value(
                                                &mut settings.theme,
                                                theme.to_string(),
                                                theme,
                                            );
                                        }
                                    });
                                if ui.button("💾 保存设置").clicked() {
                                    save_settings_clicked = true;
                                }
                            });
                        }
                        None => {
                            ui.label(
                                egui::RichText::new("尚未连接服务器，先点上面的「连接 & 刷新」")
                                    .weak(),
                            );
                        }
                    }

                    ui.add_space(10.0);

                    // ---- Discord 机器人 ----
                    ui.label(egui::RichText::new("🤖 Discord 机器人").strong());
                    match &self.discord {
                        Some(status) => {
                            let line = if status.connected {
                                format!(
                                    "在线 | 账号 {} | {} 个服务器",
                                    status.bot_user.as_deref().unwrap_or("未知"),
                                    status.guild_count
                                )
                            } else {
                                format!(
                                    "离线{}",
                                    status
                                        .last_error
                                        .as_deref()
                                        .map(|e| format!(" | {}", e))
                                        .unwrap_or_default()
                                )
                            };
                            ui.label(line);
                        }
                        None => {
                            ui.label(egui::RichText::new("状态未知").weak());
                        }
                    }
                    ui.horizontal(|ui| {
                        if ui.button("🔌 重连").clicked() {
                            self.discord_reconnect();
                        }
                        if ui.button("📨 发送测试消息").clicked() {
                            self.discord_test();
                        }
                        if ui.button("🔗 获取邀请链接").clicked() {
                            self.discord_link();
                        }
                        if let Some(url) = &self.discord_invite {
                            ui.hyperlink_to("打开邀请链接", url);
                        }
                    });

                    ui.add_space(10.0);

                    // ---- 数据备份 ----
                    ui.label(egui::RichText::new("🗄 数据库备份").strong());
                    ui.horizontal(|ui| {
                        if ui.button("📦 新建备份").clicked() {
                            self.create_backup();
                        }
                        if ui.button("⬆ 上传备份 (.zip)").clicked() {
                            self.upload_backup();
                        }
                    });
                    if self.backups.is_empty() {
                        ui.label(egui::RichText::new("暂无备份").weak());
                    } else {
                        egui::Grid::new("backups_grid")
                            .num_columns(4)
                            .spacing([10.0, 4.0])
                            .striped(true)
                            .show(ui, |ui| {
                                for info in &self.backups {
                                    ui.label(&info.name);
                                    ui.label(format_bytes(info.size));
                                    ui.label(&info.created_at);
                                    ui.horizontal(|ui| {
                                        if ui.button("⬇").on_hover_text("下载").clicked() {
                                            backup_action =
                                                Some(BackupRowAction::Download(info.name.clone()));
                                        }
                                        if ui.button("♻").on_hover_text("恢复").clicked() {
                                            backup_action = Some(BackupRowAction::AskRestore(
                                                info.name.clone(),
                                            ));
                                        }
                                        if ui.button("🗑").on_hover_text("删除").clicked() {
                                            backup_action =
                                                Some(BackupRowAction::Delete(info.name.clone()));
                                        }
                                    });
                                    ui.end_row();
                                }
                            });
                    }

                    ui.add_space(10.0);

                    // ---- 食谱数据 ----
                    ui.label(egui::RichText::new("📚 食谱数据").strong());
                    ui.horizontal(|ui| {
                        if ui.button("📤 导出全部食谱").clicked() {
                            self.export_recipes();
                        }
                        if ui.button("📥 导入食谱 (.json)").clicked() {
                            self.import_recipes();
                        }
                    });

                    ui.add_space(10.0);

                    // ---- 界面字体 ----
                    ui.label(egui::RichText::new("🔤 界面字体").strong());
                    ui.horizontal(|ui| {
                        ui.label("当前字体:");
                        egui::ComboBox::from_id_salt("ui_font_select")
                            .selected_text(self.font_choice.display_name())
                            .width(200.0)
                            .show_ui(ui, |ui| {
                                for font in catalog::list() {
                                    ui.selectable_value(
                                        &mut self.font_choice,
                                        FontChoice::Builtin(font.id.to_string()),
                                        font.name,
                                    );
                                }
                                for record in &self.custom_fonts {
                                    ui.selectable_value(
                                        &mut self.font_choice,
                                        FontChoice::Custom(record.name.clone()),
                                        format!("{} (自定义)", record.name),
                                    );
                                }
                            });
                    });
                    if let FontChoice::Builtin(id) = &self.font_choice {
                        if let Some(font) = catalog::get(id) {
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} | {} | 行高 {} | {}",
                                    font.family, font.size, font.line_height, font.description
                                ))
                                .weak()
                                .size(11.0),
                            );
                        }
                    }

                    ui.horizontal(|ui| {
                        ui.label("字号:");
                        ui.add(
                            egui::DragValue::new(&mut self.pending_font_size)
                                .range(8..=72)
                                .suffix("px"),
                        )
                        .on_hover_text("上传字体在网页端使用的字号");
                        ui.add_space(10.0);
                        ui.label("行高:");
                        ui.add(
                            egui::DragValue::new(&mut self.pending_line_height)
                                .range(0.5..=3.0)
                                .speed(0.05),
                        );
                        ui.separator();
                        if ui.button("⬆ 上传字体 (.woff2)").clicked() {
                            self.upload_font();
                        }
                    });

                    for record in &self.custom_fonts {
                        ui.horizontal(|ui| {
                            ui.label(&record.name);
                            ui.label(
                                egui::RichText::new(format!(
                                    "{} | 行高 {} | {} | {}",
                                    record.size,
                                    record.line_height,
                                    format_bytes(record.data.len() as u64),
                                    record.uploaded_at.split('T').next().unwrap_or(""),
                                ))
                                .weak()
                                .size(11.0),
                            );
                            if ui.button("📋 复制 CSS").on_hover_text("复制 @font-face 规则").clicked()
                            {
                                font_action = Some(FontRowAction::CopyCss(record.name.clone()));
                            }
                            if ui.button("🗑").on_hover_text("删除").clicked() {
                                font_action = Some(FontRowAction::Delete(record.name.clone()));
                            }
                        });
                    }
                });

            ui.separator();

            ui.horizontal(|ui| {
                if self.is_processing {
                    ui.add_enabled(false, egui::Button::new("⏳ 处理中..."));
                    ui.spinner();
                    if ui.button("❌ 取消任务").clicked() {
                        self.cancel_processing();
                    }
                }
            });

            ui.push_id("log_area", |ui| {
                ui.style_mut().spacing.item_spacing.y = 0.0;
                egui::ScrollArea::vertical()
                    .stick_to_bottom(true)
                    .auto_shrink([false, true])
                    .show(ui, |ui| {
                        for (i, entry) in self.logs.iter().enumerate() {
                            let color = match entry.level {
                                LogLevel::Info => egui::Color32::from_gray(200),
                                LogLevel::Success => egui::Color32::LIGHT_GREEN,
                                LogLevel::Warn => egui::Color32::YELLOW,
                                LogLevel::Error => egui::Color32::LIGHT_RED,
                            };

                            let bg_color = if i % 2 == 1 {
                                egui::Color32::from_gray(30)
                            } else {
                                egui::Color32::TRANSPARENT
                            };

                            let full_text = format!(
                                "{} [{}] {}",
                                entry.time,
                                entry.level.label(),
                                entry.message
                            );

                            let mut job = egui::text::LayoutJob::single_section(
                                full_text,
                                egui::TextFormat {
                                    font_id: egui::FontId::monospace(13.0),
                                    color,
                                    ..Default::default()
                                },
                            );
                            job.wrap.break_anywhere = true;

                            egui::Frame::new()
                                .fill(bg_color)
                                .inner_margin(2.0)
                                .show(ui, |ui| {
                                    ui.set_min_width(ui.available_width());

                                    ui.label(job);
                                });
                        }
                    });
            });
        });

        if theme_changed {
            if self.config.theme == "light" {
                ctx.set_visuals(egui::Visuals::light());
            } else {
                ctx.set_visuals(egui::Visuals::dark());
            }
            self.config.save();
        }

        if self.font_choice != font_choice_before {
            self.config.ui_font = self.font_choice.to_config();
            self.config.save();
            self.fonts_dirty = true;
        }

        if save_settings_clicked {
            self.save_settings();
        }

        match backup_action {
            Some(BackupRowAction::Download(name)) => self.download_backup(name),
            Some(BackupRowAction::AskRestore(name)) => self.confirm_restore = Some(name),
            Some(BackupRowAction::Delete(name)) => self.delete_backup(name),
            None => {}
        }

        match font_action {
            Some(FontRowAction::CopyCss(name)) => self.copy_font_css(ctx, &name),
            Some(FontRowAction::Delete(name)) => self.delete_font(name),
            None => {}
        }

        if self.is_processing {
            ctx.request_repaint();
        }
    }
}
