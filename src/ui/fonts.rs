use crate::logic::catalog;
use crate::logic::fontstore::CustomFontRecord;
use eframe::egui;
use font_loader::system_fonts;
use std::sync::Arc;

/// 界面字体选择：内置目录项，或本地仓库里的自定义字体。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FontChoice {
    Builtin(String),
    Custom(String),
}

impl FontChoice {
    /// 配置里存的是一个字符串，自定义字体带 "custom:" 前缀。
    /// 未知或已失效的选择回退到目录默认字体。
    pub fn from_config(raw: &str) -> Self {
        if let Some(name) = raw.strip_prefix("custom:") {
            FontChoice::Custom(name.to_string())
        } else if catalog::get(raw).is_some() {
            FontChoice::Builtin(raw.to_string())
        } else {
            FontChoice::Builtin(catalog::default_id().to_string())
        }
    }

    pub fn to_config(&self) -> String {
        match self {
            FontChoice::Builtin(id) => id.clone(),
            FontChoice::Custom(name) => format!("custom:{}", name),
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            FontChoice::Builtin(id) => catalog::get(id)
                .map(|f| f.name.to_string())
                .unwrap_or_else(|| id.clone()),
            FontChoice::Custom(name) => format!("{} (自定义)", name),
        }
    }
}

/// 从 CSS 字体栈里取出单引号包住的主字体名。
pub fn primary_family(family: &str) -> Option<&str> {
    let first = family.split(',').next()?.trim();
    let stripped = first.strip_prefix('\'')?.strip_suffix('\'')?;
    if stripped.is_empty() { None } else { Some(stripped) }
}

fn load_builtin(id: &str) -> Option<Vec<u8>> {
    let descriptor = catalog::get(id)?;
    let primary = primary_family(descriptor.family)?;
    let props = system_fonts::FontPropertyBuilder::new()
        .family(primary)
        .build();
    system_fonts::get(&props).map(|(data, _)| data)
}

/// 把选中的字体装进 egui，并追加一个 CJK 回退字体保证中文文案可见。
pub fn apply_ui_font(ctx: &egui::Context, choice: &FontChoice, customs: &[CustomFontRecord]) {
    let mut fonts = egui::FontDefinitions::default();

    let selected: Option<(String, Vec<u8>)> = match choice {
        FontChoice::Custom(name) => customs
            .iter()
            .find(|r| r.name == *name)
            .map(|r| ("user_font".to_owned(), r.data.clone())),
        FontChoice::Builtin(id) => load_builtin(id).map(|data| ("ui_font".to_owned(), data)),
    };

    if let Some((key, data)) = selected {
        fonts.font_data.insert(
            key.clone(),
            Arc::new(egui::FontData::from_owned(data)),
        );
        fonts
            .families
            .entry(egui::FontFamily::Proportional)
            .or_default()
            .insert(0, key.clone());
        fonts
            .families
            .entry(egui::FontFamily::Monospace)
            .or_default()
            .insert(0, key);
    }

    let cjk_props = system_fonts::FontPropertyBuilder::new()
        .family("Microsoft YaHei")
        .family("PingFang SC")
        .family("Noto Sans CJK SC")
        .family("SimHei")
        .build();

    if let Some((data, _)) = system_fonts::get(&cjk_props) {
        fonts.font_data.insert(
            "cjk_fallback".to_owned(),
            Arc::new(egui::FontData::from_owned(data)),
        );
        fonts
            .families
            .entry(egui::FontFamily::Proportional)
            .or_default()
            .push("cjk_fallback".to_owned());
        fonts
            .families
            .entry(egui::FontFamily::Monospace)
            .or_default()
            .push("cjk_fallback".to_owned());
    }

    ctx.set_fonts(fonts);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn choice_round_trips_through_config_string() {
        let builtin = FontChoice::Builtin("roboto".to_string());
        assert_eq!(FontChoice::from_config(&builtin.to_config()), builtin);

        let custom = FontChoice::Custom("Pico".to_string());
        assert_eq!(custom.to_config(), "custom:Pico");
        assert_eq!(FontChoice::from_config(&custom.to_config()), custom);
    }

    #[test]
    fn unknown_choice_falls_back_to_default() {
        assert_eq!(
            FontChoice::from_config("does-not-exist"),
            FontChoice::Builtin(catalog::default_id().to_string())
        );
        assert_eq!(
            FontChoice::from_config(""),
            FontChoice::Builtin(catalog::default_id().to_string())
        );
    }

    #[test]
    fn primary_family_strips_quotes() {
        assert_eq!(
            primary_family("'Noto Sans SC', 'PingFang SC', sans-serif"),
            Some("Noto Sans SC")
        );
        assert_eq!(primary_family("sans-serif"), None);
        assert_eq!(primary_family("''"), None);
    }
}
