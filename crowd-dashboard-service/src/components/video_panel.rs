use crate::html::{escape, panel};
use crowd_core::VideoFile;
use crowd_telemetry::OverlayFrame;
use std::fmt::Write as _;

pub fn render(file: &VideoFile, frame: &OverlayFrame) -> String {
    let mut body = format!(
        "<div class=\"muted\">YOLO Detection Active &middot; {}</div><div class=\"video\">",
        escape(&file.name)
    );
    for b in &frame.boxes {
        let _ = write!(
            body,
            "<div class=\"box\" style=\"left:{:.1}%;top:{:.1}%;width:{:.1}%;height:{:.1}%\">\
             <small>Person</small></div>",
            b.x, b.y, b.width, b.height
        );
    }
    let _ = write!(
        body,
        "<div class=\"counter\">Detected: <strong>{}</strong> persons</div></div>",
        frame.boxes.len()
    );

    let _ = write!(
        body,
        "<form method=\"post\" action=\"/video/toggle\" class=\"controls\">\
         <button type=\"submit\">{}</button></form>\
         <div class=\"progress\"><div style=\"width:{:.1}%\"></div></div>",
        if frame.playing { "Pause" } else { "Play" },
        frame.progress
    );

    body.push_str(
        "<div class=\"cards\"><div><div class=\"muted\">Detection Model</div>YOLOv8</div>\
         <div><div class=\"muted\">Confidence</div>94.2%</div></div>",
    );
    panel("video", "Live Crowd Analysis", &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crowd_telemetry::DetectionBox;

    #[test]
    fn counter_matches_boxes_and_button_reflects_state() {
        let file = VideoFile::accept("gate <4>.mp4", "video/mp4", 10, u64::MAX).unwrap();
        let frame = OverlayFrame {
            playing: false,
            progress: 12.3,
            boxes: vec![
                DetectionBox { x: 10.0, y: 20.0, width: 4.0, height: 8.0 };
                7
            ],
        };
        let out = render(&file, &frame);
        assert!(out.contains("Detected: <strong>7</strong> persons"));
        assert_eq!(out.matches("class=\"box\"").count(), 7);
        assert!(out.contains(">Play</button>"));
        assert!(out.contains("gate &lt;4&gt;.mp4"));
        assert!(out.contains("YOLOv8"));
    }
}
