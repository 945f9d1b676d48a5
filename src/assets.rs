//! Sprite sheets, animation maps and asset discovery
//!
//! Every bird sheet is a single row of fixed-width frames. A shared CSV map
//! names a run of frames for each clip:
//!
//! ```text
//! Perch,0,0
//! Fly,1,4
//! ```
//!
//! The map is plain comma-separated text: no header row, no quoting and no
//! commas inside fields. Quoted fields are rejected rather than unquoted.
//!
//! Image decoding belongs to the renderer; this module only needs a
//! sheet's pixel size to slice it.

use std::collections::{BTreeMap, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::consts::{ANIMATION_MAP_FILE, SPRITE_FRAME_WIDTH};
use crate::context::FeederContext;
use crate::daylight::TimeOfDay;
use crate::error::AssetError;
use crate::scene::Renderer;
use crate::sim::{BirdAnimation, Clip, Rect, Species};

/// Pixel size of a loaded sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetInfo {
    pub width: u32,
    pub height: u32,
}

/// Cut a sheet into as many whole frames as fit, left to right
pub fn slice_frames(sheet: SheetInfo, frame_width: f32) -> Vec<Rect> {
    let width = sheet.width as f32;
    let height = sheet.height as f32;
    let mut frames = Vec::new();
    let mut x = 0.0;
    while frame_width > 0.0 && x + frame_width <= width {
        frames.push(Rect::new(x, 0.0, x + frame_width, height));
        x += frame_width;
    }
    frames
}

/// Clip name to inclusive frame range
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AnimationMap {
    ranges: BTreeMap<String, (usize, usize)>,
}

impl AnimationMap {
    /// Parse `name,start,end` rows. `path` is only used in errors.
    pub fn parse(text: &str, path: &Path) -> Result<Self, AssetError> {
        let malformed = |line: usize, reason: String| AssetError::MalformedCsv {
            path: path.to_path_buf(),
            line,
            reason,
        };

        let mut ranges = BTreeMap::new();
        for (i, row) in text.lines().enumerate() {
            let line = i + 1;
            let row = row.trim();
            if row.is_empty() {
                continue;
            }
            let fields: Vec<&str> = row.split(',').map(str::trim).collect();
            let [name, start, end] = fields.as_slice() else {
                return Err(malformed(line, format!("expected 3 fields, got {}", fields.len())));
            };
            if name.is_empty() {
                return Err(malformed(line, "empty clip name".into()));
            }
            if fields.iter().any(|f| f.contains('"')) {
                return Err(malformed(line, "quoted fields are not supported".into()));
            }
            let start: usize = start
                .parse()
                .map_err(|_| malformed(line, format!("bad start frame {start:?}")))?;
            let end: usize = end
                .parse()
                .map_err(|_| malformed(line, format!("bad end frame {end:?}")))?;
            if start > end {
                return Err(malformed(line, format!("start {start} is after end {end}")));
            }
            ranges.insert(name.to_string(), (start, end));
        }

        for clip in Clip::ALL {
            if !ranges.contains_key(clip.name()) {
                return Err(AssetError::MissingClip(clip.name()));
            }
        }
        Ok(Self { ranges })
    }

    pub fn load(path: &Path) -> Result<Self, AssetError> {
        let text = std::fs::read_to_string(path).map_err(|source| io_error(path, source))?;
        Self::parse(&text, path)
    }

    pub fn range(&self, clip: Clip) -> Option<(usize, usize)> {
        self.ranges.get(clip.name()).copied()
    }

    /// Frame rectangles of every clip, checked against the frames available
    pub fn slice(&self, frames: &[Rect]) -> Result<ClipFrames, AssetError> {
        let mut clips = HashMap::new();
        for clip in Clip::ALL {
            let (start, end) = self.range(clip).ok_or(AssetError::MissingClip(clip.name()))?;
            if end >= frames.len() {
                return Err(AssetError::FrameRange {
                    name: clip.name().to_string(),
                    start,
                    end,
                    available: frames.len(),
                });
            }
            clips.insert(clip, frames[start..=end].to_vec());
        }
        Ok(ClipFrames { clips })
    }
}

/// Frames per clip for one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ClipFrames {
    clips: HashMap<Clip, Vec<Rect>>,
}

impl ClipFrames {
    pub fn frames(&self, clip: Clip) -> &[Rect] {
        self.clips.get(&clip).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Frame to draw for a bird's current animation
    pub fn current(&self, animation: &BirdAnimation) -> Option<Rect> {
        let frames = self.frames(animation.clip());
        frames.get(animation.frame_index(frames.len())).copied()
    }
}

/// A bird sheet ready to draw from
#[derive(Debug, Clone)]
pub struct SpriteSheet {
    pub path: PathBuf,
    pub info: SheetInfo,
    pub frames: ClipFrames,
}

/// Width and height from a PNG's IHDR chunk
pub fn read_png_size(path: &Path) -> Result<SheetInfo, AssetError> {
    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    let mut file = std::fs::File::open(path).map_err(|source| io_error(path, source))?;
    let mut header = [0u8; 24];
    file.read_exact(&mut header)
        .map_err(|_| AssetError::BadImage(path.to_path_buf()))?;
    let chunk_len = u32::from_be_bytes([header[8], header[9], header[10], header[11]]);
    if header[..8] != SIGNATURE || chunk_len != 13 || &header[12..16] != b"IHDR" {
        return Err(AssetError::BadImage(path.to_path_buf()));
    }
    let width = u32::from_be_bytes([header[16], header[17], header[18], header[19]]);
    let height = u32::from_be_bytes([header[20], header[21], header[22], header[23]]);
    // Zero is invalid in IHDR
    if width == 0 || height == 0 {
        return Err(AssetError::BadImage(path.to_path_buf()));
    }
    Ok(SheetInfo { width, height })
}

fn io_error(path: &Path, source: std::io::Error) -> AssetError {
    if source.kind() == std::io::ErrorKind::NotFound {
        AssetError::Missing(path.to_path_buf())
    } else {
        AssetError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// `rel` under `root`, which must exist
pub fn resolve(root: &Path, rel: &str) -> Result<PathBuf, AssetError> {
    let path = root.join(rel);
    if path.exists() {
        Ok(path)
    } else {
        Err(AssetError::Missing(path))
    }
}

/// Everything a feeder context needs on disk, checked up front
#[derive(Debug, Clone)]
pub struct AssetCatalog {
    pub root: PathBuf,
    pub sheets: HashMap<Species, SpriteSheet>,
    pub backgrounds: BTreeMap<TimeOfDay, PathBuf>,
    pub seed_images: BTreeMap<TimeOfDay, PathBuf>,
}

impl AssetCatalog {
    /// Resolve and load every asset `context` refers to. Any missing or
    /// malformed file fails the whole load.
    pub fn load(
        context: &FeederContext,
        root: &Path,
        renderer: &mut dyn Renderer,
    ) -> Result<Self, AssetError> {
        let map = AnimationMap::load(&resolve(root, ANIMATION_MAP_FILE)?)?;

        let mut sheets = HashMap::new();
        for species in context.visiting_species() {
            let path = resolve(root, species.data().sprite_sheet)?;
            let info = renderer.load_sheet(&path)?;
            let frames = map.slice(&slice_frames(info, SPRITE_FRAME_WIDTH))?;
            log::debug!(
                "Loaded {} sheet {}x{} from {}",
                species.name(),
                info.width,
                info.height,
                path.display()
            );
            sheets.insert(species, SpriteSheet { path, info, frames });
        }

        let mut backgrounds = BTreeMap::new();
        let mut seed_images = BTreeMap::new();
        for time in TimeOfDay::ALL {
            if let Some(rel) = context.background_image(time) {
                backgrounds.insert(time, resolve(root, rel)?);
            }
            if let Some(rel) = context.seed_image(time) {
                seed_images.insert(time, resolve(root, rel)?);
            }
        }

        log::info!(
            "Assets for {} loaded from {} ({} sheets)",
            context.name,
            root.display(),
            sheets.len()
        );
        Ok(Self {
            root: root.to_path_buf(),
            sheets,
            backgrounds,
            seed_images,
        })
    }

    pub fn sheet(&self, species: Species) -> Option<&SpriteSheet> {
        self.sheets.get(&species)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// A PNG header claiming the given size; enough for `read_png_size`
    pub fn fake_png(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = vec![0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes
    }

    /// Lay out every file `context` needs under `root`
    pub fn write_assets(root: &Path, context: &FeederContext) {
        let write = |rel: &str, bytes: &[u8]| {
            let path = root.join(rel);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, bytes).unwrap();
        };
        write(ANIMATION_MAP_FILE, b"Perch,0,0\nFly,1,4\nEat,5,7\nSing,8,9\n");
        for species in Species::ALL {
            write(species.data().sprite_sheet, &fake_png(430, 50));
        }
        for path in context
            .backgrounds
            .values()
            .chain(context.seed_images.values())
        {
            write(path, &fake_png(1600, 900));
        }
        for path in context.sounds.values() {
            write(path, b"not really audio");
        }
    }
}
