//! 区域：命名的三维轴对齐包围盒

use serde::{Deserialize, Serialize};

/// 轴对齐包围盒 (xmin, xmax, ymin, ymax, zmin, zmax)，边界闭区间
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
    pub zmin: f64,
    pub zmax: f64,
}

impl Region {
    pub const fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64, zmin: f64, zmax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
            zmin,
            zmax,
        }
    }

    /// 六个比较全部成立才算在内；恰好落在面上的点算在内，NaN 永远不在内
    pub fn contains(&self, p: [f64; 3]) -> bool {
        let [x, y, z] = p;
        x >= self.xmin
            && x <= self.xmax
            && y >= self.ymin
            && y <= self.ymax
            && z >= self.zmin
            && z <= self.zmax
    }
}

/// 带名字的区域；场景按声明顺序保存，占用矩阵的行序与之一致
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRegion {
    pub name: String,
    pub region: Region,
}

impl NamedRegion {
    pub fn new(name: impl Into<String>, region: Region) -> Self {
        Self {
            name: name.into(),
            region,
        }
    }
}
