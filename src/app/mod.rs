// Application layer: concrete converters and job planning for each tool.

pub mod audio;
pub mod icons;
