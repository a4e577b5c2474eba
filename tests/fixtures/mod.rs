//! Synthetic diagnostic folders and PDFs written into temporary directories

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use docforensics::Signal;
use image::{GrayImage, Luma};
use lopdf::{dictionary, Document, Object};
use tempfile::TempDir;

/// Page side in pixels; 300 / 60 rounds up to 10-pixel patches
pub const PAGE_SIDE: u32 = 300;
/// Background residual level of an untouched page
pub const BACKGROUND: u8 = 40;

/// A forensics root holding one document folder
pub struct TestFixtures {
    pub root: TempDir,
    pub document: String,
}

impl TestFixtures {
    pub fn new(document: &str) -> Self {
        let root = TempDir::new().expect("temp dir");
        fs::create_dir_all(root.path().join(document)).expect("document folder");
        Self {
            root,
            document: document.to_string(),
        }
    }

    pub fn root_path(&self) -> &Path {
        self.root.path()
    }

    pub fn folder(&self) -> PathBuf {
        self.root.path().join(&self.document)
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.root.path().join("reports")
    }

    pub fn signal_dir(&self, signal: Signal) -> PathBuf {
        let dir = self.folder().join(signal.dir_name());
        fs::create_dir_all(&dir).expect("signal dir");
        dir
    }

    pub fn write_page(&self, signal: Signal, page: u32, image: &GrayImage) -> PathBuf {
        let path = self.signal_dir(signal).join(format!("page-{}.png", page));
        image.save(&path).expect("write page");
        path
    }

    /// Same page set for all four image signals
    pub fn write_all_signals(&self, pages: &[GrayImage]) {
        for signal in Signal::ALL {
            for (index, page) in pages.iter().enumerate() {
                self.write_page(signal, index as u32 + 1, page);
            }
        }
    }

    pub fn write_corrupt_page(&self, signal: Signal, page: u32) -> PathBuf {
        let path = self.signal_dir(signal).join(format!("page-{}.png", page));
        fs::write(&path, b"\x89PNG truncated").expect("write corrupt page");
        path
    }

    pub fn preprocessed_dir(&self) -> PathBuf {
        let dir = self.folder().join("Preprocessed");
        fs::create_dir_all(&dir).expect("preprocessed dir");
        dir
    }

    pub fn write_preprocessed(&self, page: u32, image: &GrayImage) -> PathBuf {
        let path = self.preprocessed_dir().join(format!("page-{}.png", page));
        image.save(&path).expect("write preprocessed page");
        path
    }

    pub fn write_corrupt_preprocessed(&self, page: u32) -> PathBuf {
        let path = self.preprocessed_dir().join(format!("page-{}.png", page));
        fs::write(&path, b"\x89PNG truncated").expect("write corrupt preprocessed page");
        path
    }

    /// Minimal one-page PDF with the given Info entries
    pub fn write_pdf(&self, producer: Option<&str>, creator: Option<&str>) -> PathBuf {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![Object::Reference(page_id)],
                "Count" => Object::Integer(1),
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut info = lopdf::Dictionary::new();
        if let Some(producer) = producer {
            info.set("Producer", Object::string_literal(producer));
        }
        if let Some(creator) = creator {
            info.set("Creator", Object::string_literal(creator));
        }
        if producer.is_some() || creator.is_some() {
            let info_id = doc.add_object(info);
            doc.trailer.set("Info", info_id);
        }

        let path = self.root.path().join(format!("{}.pdf", self.document));
        doc.save(&path).expect("write pdf");
        path
    }
}

/// Untouched page: flat residual everywhere
pub fn clean_page() -> GrayImage {
    GrayImage::from_pixel(PAGE_SIDE, PAGE_SIDE, Luma([BACKGROUND]))
}

/// Page with one patch-aligned `side x side` block of elevated residual
pub fn edited_page(side: u32, intensity: u8) -> GrayImage {
    let mut page = clean_page();
    let origin = 120;
    for y in origin..(origin + side).min(PAGE_SIDE) {
        for x in origin..(origin + side).min(PAGE_SIDE) {
            page.put_pixel(x, y, Luma([intensity]));
        }
    }
    page
}

/// Preprocessed page with text-like bars in the top third only
pub fn text_bars_page() -> GrayImage {
    let mut page = GrayImage::from_pixel(PAGE_SIDE, PAGE_SIDE, Luma([255]));
    for top in (10..100).step_by(20) {
        for y in top..top + 10 {
            for x in 10..PAGE_SIDE - 10 {
                page.put_pixel(x, y, Luma([0]));
            }
        }
    }
    page
}
