//! 内置字体目录：启动时就固定下来的只读表。
//!
//! `family` 是发给 Web 前端的 CSS 字体栈，`google_query` 是远程字体服务的
//! 查询串，桌面端只把它们当作元数据展示/下发，不在本地解析。

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontDescriptor {
    pub id: &'static str,
    pub name: &'static str,
    pub family: &'static str,
    pub google_query: &'static str,
    pub size: &'static str,
    pub line_height: f32,
    pub description: &'static str,
}

pub const DEFAULT_FONT_ID: &str = "noto-sans-sc";

pub const BUILTIN_FONTS: &[FontDescriptor] = &[
    FontDescriptor {
        id: "noto-sans-sc",
        name: "思源黑体",
        family: "'Noto Sans SC', 'PingFang SC', 'Microsoft YaHei', sans-serif",
        google_query: "Noto+Sans+SC:wght@400;500;700",
        size: "16px",
        line_height: 1.6,
        description: "默认界面字体，中英文混排表现稳定",
    },
    FontDescriptor {
        id: "noto-serif-sc",
        name: "思源宋体",
        family: "'Noto Serif SC', 'Songti SC', 'SimSun', serif",
        google_query: "Noto+Serif+SC:wght@400;600",
        size: "16px",
        line_height: 1.8,
        description: "衬线风格，适合长篇食谱正文阅读",
    },
    FontDescriptor {
        id: "lxgw-wenkai",
        name: "霞鹜文楷",
        family: "'LXGW WenKai', 'Kaiti SC', 'KaiTi', serif",
        google_query: "LXGW+WenKai",
        size: "17px",
        line_height: 1.7,
        description: "手写楷体风格，菜谱卡片更有温度",
    },
    FontDescriptor {
        id: "roboto",
        name: "Roboto",
        family: "'Roboto', 'Helvetica Neue', 'Arial', sans-serif",
        google_query: "Roboto:wght@400;500;700",
        size: "15px",
        line_height: 1.5,
        description: "紧凑的西文无衬线，界面信息密度更高",
    },
    FontDescriptor {
        id: "lato",
        name: "Lato",
        family: "'Lato', 'Segoe UI', 'Arial', sans-serif",
        google_query: "Lato:wght@400;700",
        size: "15px",
        line_height: 1.6,
        description: "圆润的西文无衬线，标题观感友好",
    },
    FontDescriptor {
        id: "merriweather",
        name: "Merriweather",
        family: "'Merriweather', 'Georgia', serif",
        google_query: "Merriweather:wght@400;700",
        size: "16px",
        line_height: 1.8,
        description: "屏显优化的西文衬线，适合做法长文",
    },
    FontDescriptor {
        id: "jetbrains-mono",
        name: "JetBrains Mono",
        family: "'JetBrains Mono', 'Consolas', 'Menlo', monospace",
        google_query: "JetBrains+Mono:wght@400;600",
        size: "14px",
        line_height: 1.4,
        description: "等宽字体，配料用量对齐显示",
    },
];

pub fn list() -> &'static [FontDescriptor] {
    BUILTIN_FONTS
}

/// 未知 id 返回 None，调用方自行回退，不作为错误处理。
pub fn get(id: &str) -> Option<&'static FontDescriptor> {
    BUILTIN_FONTS.iter().find(|f| f.id == id)
}

pub fn default_id() -> &'static str {
    DEFAULT_FONT_ID
}

pub fn default_font() -> &'static FontDescriptor {
    get(DEFAULT_FONT_ID).expect("内置字体目录必须包含默认字体")
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn default_id_resolves_to_an_entry() {
        assert_eq!(default_font().id, default_id());
    }

    #[test]
    fn unknown_id_is_none() {
        assert!(get("comic-sans").is_none());
    }

    #[test]
    fn ids_are_unique() {
        for (i, a) in BUILTIN_FONTS.iter().enumerate() {
            for b in &BUILTIN_FONTS[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn every_entry_satisfies_catalog_invariants() {
        let size_re = Regex::new(r"^\d+px$").unwrap();
        for font in list() {
            // 字体栈以单引号包住的主名开头
            assert!(
                font.family.starts_with('\'') && font.family[1..].contains('\''),
                "{} 的 family 缺少引号主名",
                font.id
            );
            assert!(size_re.is_match(font.size), "{} 的 size 非法", font.id);
            assert!(
                font.line_height > 0.0 && font.line_height < 3.0,
                "{} 的行高超出范围",
                font.id
            );
            assert!(!font.google_query.is_empty());
            assert!(!font.description.is_empty());
        }
    }
}
