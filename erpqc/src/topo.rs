//! 地形图预处理：裁出色标，并把每张地形图缩放、裁掉左右留白，
//! 输出到`<image-dir>/extra_images`，供幻灯片排版使用。

use crate::error::{QcError, Result};
use image::error::{ImageError, ParameterError, ParameterErrorKind};
use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::{DynamicImage, GenericImageView};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 输出子目录名。
pub const EXTRA_IMAGES_DIR: &str = "extra_images";

/// 默认的实验条件编号。
pub const DEFAULT_CONDITIONS: [u32; 6] = [13, 14, 15, 16, 17, 18];

/// 像素矩形，`(x, y)`为左上角。
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// 由左、上、右、下边界（右、下不含）构造。
    #[inline]
    pub const fn from_edges(left: u32, top: u32, right: u32, bottom: u32) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TopoGeometry {
    /// 从第一个条件的第一张图中裁出色标的区域。
    pub scale_crop: CropRect,
    /// 地形图先缩放到的尺寸`(width, height)`。
    pub resize_to: (u32, u32),
    /// 缩放后保留的区域。
    pub map_crop: CropRect,
    /// 每个条件的时间点（毫秒），文件名为`<cond>_<time>.gif`。
    pub times: Vec<u32>,
}

impl Default for TopoGeometry {
    fn default() -> Self {
        Self {
            scale_crop: CropRect::from_edges(0, 50, 27, 50 + 632),
            resize_to: (153 + 808, 755),
            map_crop: CropRect::from_edges(153, 0, 808, 755),
            times: (200..1000).step_by(50).collect(),
        }
    }
}

#[inline]
pub fn map_file_name(condition: u32, time: u32) -> String {
    format!("{condition}_{time}.gif")
}

/// 裁出`r`。`crop_imm`会把超出图像的部分静默截掉，这里改为报错。
fn crop_within(
    img: &DynamicImage,
    r: CropRect,
) -> std::result::Result<DynamicImage, ImageError> {
    let (w, h) = img.dimensions();
    let fits = u64::from(r.x) + u64::from(r.width) <= u64::from(w)
        && u64::from(r.y) + u64::from(r.height) <= u64::from(h);
    if !fits {
        return Err(ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        )));
    }
    Ok(img.crop_imm(r.x, r.y, r.width, r.height))
}

pub fn crop_scale(
    img: &DynamicImage,
    g: &TopoGeometry,
) -> std::result::Result<DynamicImage, ImageError> {
    crop_within(img, g.scale_crop)
}

/// GIF是调色板图像，缩放用最近邻，不引入新颜色。
pub fn crop_map(
    img: &DynamicImage,
    g: &TopoGeometry,
) -> std::result::Result<DynamicImage, ImageError> {
    let (w, h) = g.resize_to;
    crop_within(&img.resize_exact(w, h, FilterType::Nearest), g.map_crop)
}

#[derive(Debug, Default)]
pub struct TopoReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, QcError)>,
}

fn open_image(path: &Path) -> Result<DynamicImage> {
    let to_err = |source| QcError::Image {
        path: path.to_path_buf(),
        source,
    };
    ImageReader::open(path)
        .map_err(|e| to_err(image::ImageError::IoError(e)))?
        .decode()
        .map_err(to_err)
}

fn transform(
    src: &Path,
    dest: &Path,
    f: impl FnOnce(&DynamicImage) -> std::result::Result<DynamicImage, ImageError>,
) -> Result<()> {
    let img = open_image(src)?;
    let out = f(&img).map_err(|source| QcError::Image {
        path: src.to_path_buf(),
        source,
    })?;
    out.save(dest).map_err(|source| QcError::Image {
        path: dest.to_path_buf(),
        source,
    })
}

/// 处理`image_dir`下所有条件、所有时间点的地形图。
/// 色标取自`conditions`中第一个条件的第一个时间点。
/// 单张图片失败不影响其余图片；只有输出目录无法创建时返回错误。
pub fn prepare_topo_maps(
    image_dir: &Path,
    conditions: &[u32],
    g: &TopoGeometry,
) -> Result<TopoReport> {
    let out_dir = image_dir.join(EXTRA_IMAGES_DIR);
    fs::create_dir_all(&out_dir).map_err(|source| QcError::CreateDir {
        path: out_dir.clone(),
        source,
    })?;

    let mut jobs: Vec<(PathBuf, PathBuf, bool)> = Vec::new();
    if let (Some(&first), Some(&t0)) = (conditions.first(), g.times.first()) {
        jobs.push((
            image_dir.join(map_file_name(first, t0)),
            out_dir.join("scale.gif"),
            true,
        ));
    }
    for &cond in conditions {
        for &time in &g.times {
            let name = map_file_name(cond, time);
            jobs.push((image_dir.join(&name), out_dir.join(&name), false));
        }
    }

    let mut report = TopoReport::default();
    for (src, dest, is_scale) in jobs {
        let r = if is_scale {
            transform(&src, &dest, |img| crop_scale(img, g))
        } else {
            transform(&src, &dest, |img| crop_map(img, g))
        };
        match r {
            Ok(()) => report.written.push(dest),
            Err(e) => {
                warn!("{} skipped: {e}", src.display());
                report.failed.push((src, e));
            }
        }
    }
    info!(
        "{} images written to {}, {} failed",
        report.written.len(),
        out_dir.display(),
        report.failed.len()
    );
    Ok(report)
}
